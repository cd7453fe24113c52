//! Snapshot entities: the statically-predicted resource list for one
//! template, and the metadata envelope the batch processors persist.

pub mod assembler;
pub mod processor;
pub mod writer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub use assembler::{DeploymentSource, assemble, snapshot_deployment};
pub use processor::{CorpusMetadata, ProcessOutcome, ProcessorOptions, process_corpus};
pub use writer::{DirSnapshotWriter, SnapshotWriter};

/// A structural, statically-predicted deployment result. Immutable once
/// produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Predicted resource bodies, ARM resources first, extension
    /// resources appended, engine order within each group.
    pub predicted_resources: Vec<Value>,
    /// Formatted diagnostics, engine order.
    pub diagnostics: Vec<String>,
}

/// Snapshot plus the corpus metadata it was built from. Written once per
/// processed source; never mutated after the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotWithMetadata {
    /// Deterministic id derived from `source_uri`; reprocessing the same
    /// source overwrites the same entry.
    pub id: Uuid,
    /// Stable URI of the source the snapshot was built from.
    pub source_uri: String,
    /// Human-readable name from the corpus descriptor.
    pub display_name: String,
    /// Longer description from the corpus descriptor.
    pub description: String,
    /// Short summary from the corpus descriptor.
    pub summary: String,
    /// Last-updated stamp from the corpus descriptor, when parseable.
    pub date_updated: Option<DateTime<Utc>>,
    /// The snapshot itself.
    pub snapshot: Snapshot,
    /// Distinct resource type strings found in the predicted resources.
    pub resource_types: Vec<String>,
}

/// Derives the stable 128-bit snapshot id for a source URI: the leading
/// 16 bytes of the URI's SHA-256. Same URI in, same id out.
pub fn deterministic_id(source_uri: &str) -> Uuid {
    let digest = Sha256::digest(source_uri.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

/// Distinct `type` strings across predicted resources, case-insensitive,
/// first-seen casing and order kept.
pub fn distinct_resource_types(resources: &[Value]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut types = Vec::new();
    for resource in resources {
        if let Some(resource_type) = resource.get("type").and_then(Value::as_str) {
            if seen.insert(resource_type.to_lowercase()) {
                types.push(resource_type.to_string());
            }
        }
    }
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deterministic_id_is_stable() {
        let uri = "https://example.com/corpus/app/metadata.json";
        assert_eq!(deterministic_id(uri), deterministic_id(uri));
    }

    #[test]
    fn test_deterministic_id_differs_across_uris() {
        assert_ne!(
            deterministic_id("https://example.com/a"),
            deterministic_id("https://example.com/b")
        );
    }

    #[test]
    fn test_deterministic_id_golden_value() {
        // Leading 16 bytes of SHA-256(""), pinned so the id scheme cannot
        // drift silently between releases.
        assert_eq!(
            deterministic_id("").to_string(),
            "e3b0c442-98fc-1c14-9afb-f4c8996fb924"
        );
    }

    #[test]
    fn test_distinct_resource_types_case_insensitive() {
        let resources = vec![
            json!({"type": "Microsoft.Storage/storageAccounts"}),
            json!({"type": "microsoft.storage/storageaccounts"}),
            json!({"type": "Microsoft.KeyVault/vaults"}),
            json!({"name": "typeless"}),
        ];
        assert_eq!(
            distinct_resource_types(&resources),
            ["Microsoft.Storage/storageAccounts", "Microsoft.KeyVault/vaults"]
        );
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = Snapshot {
            predicted_resources: vec![json!({"type": "T"})],
            diagnostics: vec!["d".to_string()],
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value.get("predictedResources").is_some());
        assert!(value.get("diagnostics").is_some());
    }
}
