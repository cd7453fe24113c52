//! Snapshot persistence seam.
//!
//! Writers are keyed by the envelope's deterministic id: distinct-key
//! writes may run concurrently, and a same-key rewrite is last-write-wins
//! (content for a given source URI is expected to be stable between
//! runs). Failed writes are not retried here.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::core::ArmsnapError;
use crate::snapshot::SnapshotWithMetadata;

/// Sink for snapshot envelopes.
#[async_trait]
pub trait SnapshotWriter: Send + Sync {
    /// Persists one envelope under its deterministic id.
    async fn write(&self, entry: &SnapshotWithMetadata) -> Result<(), ArmsnapError>;
}

/// Writes each envelope as pretty-printed JSON to `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct DirSnapshotWriter {
    output_dir: PathBuf,
}

impl DirSnapshotWriter {
    /// Creates a writer targeting `output_dir`; the directory is created
    /// on first write.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl SnapshotWriter for DirSnapshotWriter {
    async fn write(&self, entry: &SnapshotWithMetadata) -> Result<(), ArmsnapError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(format!("{}.json", entry.id));
        let json = serde_json::to_string_pretty(entry)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
