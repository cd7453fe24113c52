//! armsnap CLI entry point.
//!
//! Parses arguments, wires Ctrl-C to the cancellation token, executes the
//! selected command, and renders failures with suggestions.

use anyhow::Result;
use armsnap::cli::Cli;
use armsnap::core::{CancelToken, user_friendly_error};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    match cli.execute(cancel).await {
        Ok(()) => Ok(()),
        Err(error) => {
            user_friendly_error(error).display();
            std::process::exit(1);
        }
    }
}
