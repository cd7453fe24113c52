//! Expansion engine driven as an external subprocess.
//!
//! The engine is a separate executable: it reads one [`ExpandRequest`]
//! document from stdin and writes one [`ExpansionResult`] document to
//! stdout, reporting failure through a non-zero exit status and stderr.
//! This mirrors how the rest of the toolchain treats heavyweight
//! collaborators (compilers, engines): as processes, not linked code.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::constants::ENGINE_ENV_VAR;
use crate::core::{ArmsnapError, CancelToken};
use crate::expansion::{ExpandRequest, ExpansionEngine, ExpansionResult};

/// [`ExpansionEngine`] implementation that shells out to a configured
/// engine command.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    /// Creates an engine from a command line, split on whitespace into
    /// program and arguments.
    pub fn new(command_line: &str) -> Result<Self, ArmsnapError> {
        let mut parts = command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or(ArmsnapError::EngineNotConfigured)?
            .to_string();
        Ok(Self {
            program,
            args: parts.map(str::to_string).collect(),
        })
    }

    /// Resolves the engine command from an explicit flag value, falling
    /// back to the `ARMSNAP_ENGINE` environment variable.
    pub fn resolve(flag: Option<&str>) -> Result<Self, ArmsnapError> {
        match flag {
            Some(command_line) => Self::new(command_line),
            None => match std::env::var(ENGINE_ENV_VAR) {
                Ok(command_line) => Self::new(&command_line),
                Err(_) => Err(ArmsnapError::EngineNotConfigured),
            },
        }
    }

    /// The command line this engine will run, for logging.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

#[async_trait]
impl ExpansionEngine for CommandEngine {
    async fn expand(
        &self,
        request: &ExpandRequest,
        cancel: &CancelToken,
    ) -> Result<ExpansionResult, ArmsnapError> {
        if cancel.is_cancelled() {
            return Err(ArmsnapError::Cancelled);
        }

        let payload = serde_json::to_vec(request)?;
        debug!(
            engine = %self.command_line(),
            bytes = payload.len(),
            "invoking expansion engine"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ArmsnapError::EngineSpawnFailed {
                command: self.command_line(),
                reason: e.to_string(),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| ArmsnapError::ExpansionFailed {
            reason: "engine stdin was not captured".to_string(),
        })?;
        stdin.write_all(&payload).await?;
        drop(stdin);

        // kill_on_drop reaps the child if cancellation wins the race.
        let output = tokio::select! {
            () = cancel.cancelled() => return Err(ArmsnapError::Cancelled),
            output = child.wait_with_output() => output?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ArmsnapError::ExpansionFailed {
                reason: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            ArmsnapError::EngineResponseInvalid {
                reason: e.to_string(),
            }
        })
    }
}
