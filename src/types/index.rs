//! Resource type index: lookup of type definitions by `type@apiVersion`.
//!
//! The index is a JSON document mapping `"<resourceType>@<apiVersion>"`
//! keys to self-contained type graph entries. Lookups are
//! case-insensitive. A miss never comes back empty-handed: the error
//! carries the closest alternatives (other API versions of the same type,
//! or the provider's other types, or nearest-name matches) so the caller
//! can self-correct without a second round trip.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::ArmsnapError;
use crate::types::{TypeGraph, TypeRef};

/// How many nearest-name suggestions to offer when neither the type nor
/// its provider namespace matches anything.
const MAX_NAME_SUGGESTIONS: usize = 5;

/// One resource type definition: a graph plus the root of its body type.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeEntry {
    /// Node arena for this definition.
    pub nodes: TypeGraph,
    /// Root node of the resource body.
    pub body: TypeRef,
}

#[derive(Debug, Deserialize)]
struct IndexDocument {
    resources: IndexMap<String, TypeEntry>,
}

/// In-memory resource type index.
#[derive(Debug, Default)]
pub struct TypeIndex {
    entries: IndexMap<String, TypeEntry>,
    /// Lowercased key to canonical key.
    by_lower: HashMap<String, String>,
}

impl TypeIndex {
    /// Loads and validates an index file.
    pub fn load(path: &Path) -> Result<Self, ArmsnapError> {
        let text = std::fs::read_to_string(path).map_err(|e| ArmsnapError::TypeIndexError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ArmsnapError::TypeIndexError { reason, .. } => ArmsnapError::TypeIndexError {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parses an index document from JSON text and validates every entry's
    /// graph, so later compilation can treat dangling references as
    /// unreachable.
    pub fn from_json(text: &str) -> Result<Self, ArmsnapError> {
        let document: IndexDocument =
            serde_json::from_str(text).map_err(|e| ArmsnapError::TypeIndexError {
                path: "<inline>".to_string(),
                reason: e.to_string(),
            })?;

        let mut by_lower = HashMap::with_capacity(document.resources.len());
        for (key, entry) in &document.resources {
            if let Err(index) = entry.nodes.check_refs() {
                return Err(ArmsnapError::MalformedTypeGraph {
                    entry: key.clone(),
                    index,
                    len: entry.nodes.len(),
                });
            }
            if entry.nodes.get(entry.body).is_none() {
                return Err(ArmsnapError::MalformedTypeGraph {
                    entry: key.clone(),
                    index: entry.body.0,
                    len: entry.nodes.len(),
                });
            }
            by_lower.insert(key.to_lowercase(), key.clone());
        }

        Ok(Self {
            entries: document.resources,
            by_lower,
        })
    }

    /// Number of definitions in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no definitions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates canonical `type@apiVersion` keys in index order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolves a resource type at an API version, case-insensitively.
    ///
    /// On a miss, reports alternatives in three stages mirroring how a
    /// caller is most likely to have erred: wrong API version for a known
    /// type, then wrong type within a known provider namespace, then
    /// nearest type names overall.
    pub fn lookup(
        &self,
        resource_type: &str,
        api_version: &str,
    ) -> Result<&TypeEntry, ArmsnapError> {
        let key = format!("{resource_type}@{api_version}").to_lowercase();
        if let Some(canonical) = self.by_lower.get(&key) {
            return Ok(&self.entries[canonical]);
        }

        let type_prefix = format!("{}@", resource_type.to_lowercase());
        let known_versions: Vec<String> = self
            .entries
            .keys()
            .filter(|k| k.to_lowercase().starts_with(&type_prefix))
            .filter_map(|k| k.split_once('@').map(|(_, v)| v.to_string()))
            .collect();
        if !known_versions.is_empty() {
            return Err(ArmsnapError::UnknownApiVersion {
                resource_type: resource_type.to_string(),
                api_version: api_version.to_string(),
                known_versions,
            });
        }

        let provider = resource_type.split('/').next().unwrap_or(resource_type);
        let provider_prefix = format!("{}/", provider.to_lowercase());
        let mut provider_types = self.distinct_type_names(|name| {
            name.to_lowercase().starts_with(&provider_prefix)
        });
        if !provider_types.is_empty() {
            provider_types.sort();
            return Err(ArmsnapError::UnknownResourceType {
                resource_type: resource_type.to_string(),
                api_version: api_version.to_string(),
                suggestions: provider_types,
            });
        }

        Err(ArmsnapError::UnknownResourceType {
            resource_type: resource_type.to_string(),
            api_version: api_version.to_string(),
            suggestions: self.nearest_type_names(resource_type),
        })
    }

    fn distinct_type_names(&self, mut keep: impl FnMut(&str) -> bool) -> Vec<String> {
        let mut seen = HashMap::new();
        for key in self.entries.keys() {
            let name = key.split_once('@').map_or(key.as_str(), |(t, _)| t);
            if keep(name) {
                seen.entry(name.to_lowercase()).or_insert_with(|| name.to_string());
            }
        }
        seen.into_values().collect()
    }

    fn nearest_type_names(&self, resource_type: &str) -> Vec<String> {
        let wanted = resource_type.to_lowercase();
        let mut names = self.distinct_type_names(|_| true);
        names.sort_by_key(|name| strsim::levenshtein(&name.to_lowercase(), &wanted));
        names.truncate(MAX_NAME_SUGGESTIONS);
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> TypeIndex {
        TypeIndex::from_json(
            r#"{
                "resources": {
                    "Microsoft.KeyVault/vaults@2023-07-01": {"nodes": [{"$type": "any"}], "body": 0},
                    "Microsoft.KeyVault/vaults@2024-11-01": {"nodes": [{"$type": "any"}], "body": 0},
                    "Microsoft.KeyVault/vaults/secrets@2024-11-01": {"nodes": [{"$type": "any"}], "body": 0},
                    "Microsoft.Storage/storageAccounts@2024-01-01": {"nodes": [{"$type": "any"}], "body": 0}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let index = sample_index();
        assert!(index.lookup("microsoft.keyvault/VAULTS", "2024-11-01").is_ok());
    }

    #[test]
    fn test_miss_reports_other_api_versions() {
        let index = sample_index();
        let err = index.lookup("Microsoft.KeyVault/vaults", "2020-01-01").unwrap_err();
        match err {
            ArmsnapError::UnknownApiVersion { known_versions, .. } => {
                assert_eq!(known_versions, ["2023-07-01", "2024-11-01"]);
            }
            other => panic!("expected UnknownApiVersion, got {other}"),
        }
    }

    #[test]
    fn test_miss_reports_provider_types() {
        let index = sample_index();
        let err = index.lookup("Microsoft.KeyVault/wallets", "2024-11-01").unwrap_err();
        match err {
            ArmsnapError::UnknownResourceType { suggestions, .. } => {
                assert_eq!(
                    suggestions,
                    ["Microsoft.KeyVault/vaults", "Microsoft.KeyVault/vaults/secrets"]
                );
            }
            other => panic!("expected UnknownResourceType, got {other}"),
        }
    }

    #[test]
    fn test_miss_falls_back_to_nearest_names() {
        let index = sample_index();
        let err = index.lookup("Microsoft.Storrage/storageAccounts", "2024-01-01").unwrap_err();
        match err {
            ArmsnapError::UnknownResourceType { suggestions, .. } => {
                assert_eq!(suggestions[0], "Microsoft.Storage/storageAccounts");
            }
            other => panic!("expected UnknownResourceType, got {other}"),
        }
    }

    #[test]
    fn test_malformed_graph_rejected_at_load() {
        let err = TypeIndex::from_json(
            r#"{"resources": {"A/b@1": {"nodes": [{"$type": "array", "itemType": 9}], "body": 0}}}"#,
        )
        .unwrap_err();
        match err {
            ArmsnapError::MalformedTypeGraph { entry, index, len } => {
                assert_eq!(entry, "A/b@1");
                assert_eq!(index, 9);
                assert_eq!(len, 1);
            }
            other => panic!("expected MalformedTypeGraph, got {other}"),
        }
    }
}
