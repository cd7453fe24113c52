//! Command-line interface.
//!
//! Three subcommands cover the toolkit's surfaces:
//! - `schema` - compile a resource type definition into a JSON schema
//! - `snapshot` - snapshot a single deployment template
//! - `process` - batch-process a corpus of templates into snapshots
//!
//! Global flags handle verbosity and progress rendering; each subcommand
//! module owns its own arguments and execution.

mod process;
mod schema;
mod snapshot;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::core::CancelToken;

pub use process::ProcessCommand;
pub use schema::SchemaCommand;
pub use snapshot::SnapshotCommand;

/// Top-level CLI for armsnap.
#[derive(Parser)]
#[command(
    name = "armsnap",
    about = "Deployment template snapshots and resource schemas, without a live cloud target",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to `RUST_LOG=armsnap=debug`).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress bars (automatic in non-TTY environments).
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Compile a resource type definition into a JSON schema.
    Schema(SchemaCommand),
    /// Build the predicted snapshot for one deployment template.
    Snapshot(SnapshotCommand),
    /// Batch-process a template corpus into snapshot envelopes.
    Process(ProcessCommand),
}

impl Cli {
    /// Dispatches to the selected subcommand.
    pub async fn execute(self, cancel: CancelToken) -> Result<()> {
        init_tracing(self.verbose, self.quiet);
        match self.command {
            Commands::Schema(command) => command.execute().await,
            Commands::Snapshot(command) => command.execute(&cancel).await,
            Commands::Process(command) => {
                let show_progress = !(self.no_progress || self.quiet);
                command.execute(&cancel, show_progress).await
            }
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("armsnap=debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("armsnap=info"))
    };

    // try_init: tests may execute multiple commands in one process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
