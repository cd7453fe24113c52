//! `armsnap process` - batch-process a template corpus.

use std::path::PathBuf;

use anyhow::{Result, bail, ensure};
use clap::Args;
use colored::Colorize;

use crate::constants::{DEFAULT_CORPUS_BASE_URI, DEFAULT_MAX_PARALLEL};
use crate::core::CancelToken;
use crate::expansion::CommandEngine;
use crate::snapshot::{DirSnapshotWriter, ProcessorOptions, process_corpus};
use crate::utils::ProgressReporter;

/// Batch-process a corpus of deployment templates into snapshot
/// envelopes.
#[derive(Debug, Args)]
pub struct ProcessCommand {
    /// Corpus root directory to walk for `metadata.json` descriptors.
    #[arg(value_name = "CORPUS_ROOT")]
    pub corpus_root: PathBuf,

    /// Directory the snapshot envelopes are written to.
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Expansion engine command (falls back to `ARMSNAP_ENGINE`).
    #[arg(long, value_name = "COMMAND")]
    pub engine: Option<String>,

    /// Maximum number of sources processed concurrently.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_PARALLEL)]
    pub max_parallel: usize,

    /// URI prefix used to form each source's stable URI (the snapshot-id
    /// seed).
    #[arg(long, value_name = "URI", default_value = DEFAULT_CORPUS_BASE_URI)]
    pub base_uri: String,
}

impl ProcessCommand {
    /// Runs the corpus and prints the tally. Individual source failures
    /// are logged, not fatal; the command only fails when nothing could
    /// be processed at all.
    pub async fn execute(self, cancel: &CancelToken, show_progress: bool) -> Result<()> {
        ensure!(
            self.corpus_root.is_dir(),
            "corpus root {} is not a directory",
            self.corpus_root.display()
        );

        let engine = CommandEngine::resolve(self.engine.as_deref())?;
        let writer = DirSnapshotWriter::new(&self.out);
        let mut options = ProcessorOptions::new(&self.corpus_root);
        options.base_uri = self.base_uri.clone();
        options.max_parallel = self.max_parallel;

        let progress = if show_progress {
            ProgressReporter::bar(0)
        } else {
            ProgressReporter::hidden()
        };

        let outcome = process_corpus(&engine, &writer, &options, &progress, cancel).await;
        progress.finish();

        println!(
            "{} {} processed, {} skipped, {} failed",
            "Corpus run:".bold(),
            outcome.processed.to_string().green(),
            outcome.skipped,
            if outcome.failed > 0 {
                outcome.failed.to_string().red().to_string()
            } else {
                outcome.failed.to_string()
            }
        );
        if outcome.cancelled {
            println!("{}", "Run cancelled before completing.".yellow());
        }

        if outcome.failed > 0 && outcome.processed == 0 && !outcome.cancelled {
            bail!("all {} corpus sources failed", outcome.failed);
        }
        Ok(())
    }
}
