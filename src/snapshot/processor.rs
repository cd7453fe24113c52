//! Batch corpus processing.
//!
//! Walks a corpus of example templates (one `metadata.json` descriptor
//! per entry, with `azuredeploy.json` / `azuredeploy.parameters.json`
//! siblings), builds one snapshot per entry under a fully symbolic
//! deployment context, and writes the envelope through the configured
//! [`SnapshotWriter`]. A sibling `azuredeploy.snapshot.json` is also
//! dropped next to each processed template.
//!
//! Sources are independent: they are processed on a bounded worker pool,
//! a malformed source is logged and skipped, and a failing source never
//! halts the batch. Cancellation is observed at every per-source boundary
//! and inside the expansion call.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use futures::StreamExt;
use futures::stream;
use serde::Deserialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::constants::{
    DEFAULT_CORPUS_BASE_URI, DEFAULT_MAX_PARALLEL, METADATA_FILE_NAME, PARAMETERS_FILE_NAME,
    SNAPSHOT_FILE_NAME, TEMPLATE_FILE_NAME,
};
use crate::core::{ArmsnapError, CancelToken};
use crate::expansion::ExpansionEngine;
use crate::snapshot::{
    SnapshotWithMetadata, SnapshotWriter, assemble, deterministic_id, distinct_resource_types,
};
use crate::symbolic::{DeploymentOverrides, bind_parameters, build_metadata};
use crate::template::{ParametersFile, Template};
use crate::utils::ProgressReporter;

/// Corpus entry descriptor (`metadata.json`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusMetadata {
    /// Descriptor type tag, when present.
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    /// Display name of the entry.
    #[serde(default)]
    pub item_display_name: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Short summary.
    #[serde(default)]
    pub summary: String,
    /// Author attribution, when present.
    #[serde(default)]
    pub github_username: Option<String>,
    /// Last-updated date as written in the descriptor.
    #[serde(default)]
    pub date_updated: Option<String>,
    /// Environments the entry targets.
    #[serde(default)]
    pub environments: Vec<String>,
}

impl CorpusMetadata {
    /// The descriptor's date, as a UTC timestamp. Descriptors write plain
    /// dates (`2024-06-01`) or full timestamps; anything unparseable is
    /// treated as absent rather than failing the source.
    pub fn parsed_date_updated(&self) -> Option<DateTime<Utc>> {
        let text = self.date_updated.as_deref()?;
        if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
            return Some(stamp.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

/// Knobs for one corpus run.
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Corpus root directory to walk.
    pub corpus_root: PathBuf,
    /// URI prefix joined with each descriptor's corpus-relative path to
    /// form the stable source URI (the snapshot-id seed).
    pub base_uri: String,
    /// Bound on concurrently processed sources.
    pub max_parallel: usize,
}

impl ProcessorOptions {
    /// Options with the standard base URI and parallelism.
    pub fn new(corpus_root: impl Into<PathBuf>) -> Self {
        Self {
            corpus_root: corpus_root.into(),
            base_uri: DEFAULT_CORPUS_BASE_URI.to_string(),
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }
}

/// Tally of one corpus run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Sources snapshotted and written.
    pub processed: usize,
    /// Sources skipped without error (missing siblings, foreign schema,
    /// unreadable descriptor).
    pub skipped: usize,
    /// Sources that raised and were logged.
    pub failed: usize,
    /// Whether the run was cut short by cancellation.
    pub cancelled: bool,
}

enum SourceOutcome {
    Processed,
    Skipped,
    Failed,
    Cancelled,
}

/// Processes every corpus entry under `options.corpus_root`.
///
/// Individual failures are downgraded to warnings so a single corpus
/// entry never halts the batch; the tally reports how the run went.
pub async fn process_corpus(
    engine: &dyn ExpansionEngine,
    writer: &dyn SnapshotWriter,
    options: &ProcessorOptions,
    progress: &ProgressReporter,
    cancel: &CancelToken,
) -> ProcessOutcome {
    let sources = discover_sources(&options.corpus_root);
    info!(
        corpus = %options.corpus_root.display(),
        sources = sources.len(),
        "processing corpus"
    );
    progress.set_length(sources.len() as u64);

    let outcomes: Vec<SourceOutcome> = stream::iter(sources)
        .map(|path| async move {
            let outcome = process_source(engine, writer, options, &path, cancel).await;
            progress.inc();
            outcome
        })
        .buffer_unordered(options.max_parallel.max(1))
        .collect()
        .await;

    let mut tally = ProcessOutcome::default();
    for outcome in outcomes {
        match outcome {
            SourceOutcome::Processed => tally.processed += 1,
            SourceOutcome::Skipped => tally.skipped += 1,
            SourceOutcome::Failed => tally.failed += 1,
            SourceOutcome::Cancelled => tally.cancelled = true,
        }
    }

    info!(
        processed = tally.processed,
        skipped = tally.skipped,
        failed = tally.failed,
        cancelled = tally.cancelled,
        "corpus run complete"
    );
    tally
}

/// Finds every descriptor under the root, in path order so runs are
/// deterministic.
fn discover_sources(corpus_root: &Path) -> Vec<PathBuf> {
    WalkDir::new(corpus_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(%error, "skipping unreadable corpus entry");
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file() && entry.file_name() == METADATA_FILE_NAME
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

async fn process_source(
    engine: &dyn ExpansionEngine,
    writer: &dyn SnapshotWriter,
    options: &ProcessorOptions,
    metadata_path: &Path,
    cancel: &CancelToken,
) -> SourceOutcome {
    if cancel.is_cancelled() {
        return SourceOutcome::Cancelled;
    }

    match snapshot_source(engine, writer, options, metadata_path, cancel).await {
        Ok(Some(())) => SourceOutcome::Processed,
        Ok(None) => SourceOutcome::Skipped,
        Err(ArmsnapError::Cancelled) => SourceOutcome::Cancelled,
        Err(error) => {
            warn!(
                source = %metadata_path.display(),
                %error,
                "failed to process corpus source"
            );
            SourceOutcome::Failed
        }
    }
}

/// `Ok(Some(()))` on a written snapshot, `Ok(None)` on a silent skip.
async fn snapshot_source(
    engine: &dyn ExpansionEngine,
    writer: &dyn SnapshotWriter,
    options: &ProcessorOptions,
    metadata_path: &Path,
    cancel: &CancelToken,
) -> Result<Option<()>, ArmsnapError> {
    let Some(source_dir) = metadata_path.parent() else {
        return Ok(None);
    };

    let template_path = source_dir.join(TEMPLATE_FILE_NAME);
    let parameters_path = source_dir.join(PARAMETERS_FILE_NAME);
    if !template_path.is_file() || !parameters_path.is_file() {
        debug!(
            source = %metadata_path.display(),
            "skipping source without template/parameters siblings"
        );
        return Ok(None);
    }

    let metadata_text = tokio::fs::read_to_string(metadata_path).await?;
    let Ok(metadata) = serde_json::from_str::<CorpusMetadata>(&metadata_text) else {
        debug!(
            source = %metadata_path.display(),
            "skipping source with unreadable descriptor"
        );
        return Ok(None);
    };

    let template_text = tokio::fs::read_to_string(&template_path).await?;
    let template = Template::parse(&template_text)?;
    if !template.is_deployment_template() {
        debug!(
            source = %metadata_path.display(),
            schema = template.schema_uri(),
            "skipping non-deployment template"
        );
        return Ok(None);
    }

    let parameters_text = tokio::fs::read_to_string(&parameters_path).await?;
    let parameters = ParametersFile::parse(&parameters_text)?;

    // Fully symbolic context: batch runs never know real scope values.
    let deployment_metadata = build_metadata(&DeploymentOverrides::default());
    let bindings = bind_parameters(&template, parameters.values());
    let snapshot = assemble(engine, &template, bindings, deployment_metadata, cancel).await?;

    let sibling_path = source_dir.join(SNAPSHOT_FILE_NAME);
    tokio::fs::write(&sibling_path, serde_json::to_string_pretty(&snapshot)?).await?;

    let source_uri = source_uri(options, metadata_path);
    let entry = SnapshotWithMetadata {
        id: deterministic_id(&source_uri),
        source_uri,
        display_name: metadata.item_display_name.clone(),
        description: metadata.description.clone(),
        summary: metadata.summary.clone(),
        date_updated: metadata.parsed_date_updated(),
        resource_types: distinct_resource_types(&snapshot.predicted_resources),
        snapshot,
    };
    writer.write(&entry).await?;
    Ok(Some(()))
}

/// Stable source URI: base URI plus the descriptor's corpus-relative path
/// with forward-slash separators.
fn source_uri(options: &ProcessorOptions, metadata_path: &Path) -> String {
    let relative = metadata_path
        .strip_prefix(&options.corpus_root)
        .unwrap_or(metadata_path);
    let relative: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!(
        "{}/{}",
        options.base_uri.trim_end_matches('/'),
        relative.join("/")
    )
}
