//! `armsnap snapshot` - snapshot one deployment template.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::core::CancelToken;
use crate::expansion::CommandEngine;
use crate::snapshot::{DeploymentSource, snapshot_deployment};
use crate::symbolic::DeploymentOverrides;

/// Build the predicted snapshot for one deployment template.
///
/// Scope values left unset are carried as symbolic placeholders, exactly
/// as in batch processing; supplying them narrows the prediction.
#[derive(Debug, Args)]
pub struct SnapshotCommand {
    /// Deployment template file.
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Parameters file; omitted parameters behave as an empty parameters
    /// file.
    #[arg(long, short = 'p', value_name = "FILE")]
    pub parameters: Option<PathBuf>,

    /// Concrete tenant id.
    #[arg(long, value_name = "ID")]
    pub tenant_id: Option<String>,

    /// Concrete subscription id.
    #[arg(long, value_name = "ID")]
    pub subscription_id: Option<String>,

    /// Concrete resource group name.
    #[arg(long, value_name = "NAME")]
    pub resource_group: Option<String>,

    /// Concrete resource group location.
    #[arg(long, value_name = "LOCATION")]
    pub location: Option<String>,

    /// Concrete deployment name.
    #[arg(long, value_name = "NAME")]
    pub deployment_name: Option<String>,

    /// Expansion engine command (falls back to `ARMSNAP_ENGINE`).
    #[arg(long, value_name = "COMMAND")]
    pub engine: Option<String>,

    /// Write the snapshot here instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl SnapshotCommand {
    /// Reads the inputs, drives expansion, and emits the snapshot.
    pub async fn execute(self, cancel: &CancelToken) -> Result<()> {
        let template_text = tokio::fs::read_to_string(&self.template)
            .await
            .with_context(|| format!("failed to read template {}", self.template.display()))?;

        let parameters_text = match &self.parameters {
            Some(path) => Some(tokio::fs::read_to_string(path).await.with_context(|| {
                format!("failed to read parameters file {}", path.display())
            })?),
            None => None,
        };

        let engine = CommandEngine::resolve(self.engine.as_deref())?;
        let source = DeploymentSource {
            template_text,
            parameters_text,
            overrides: DeploymentOverrides {
                tenant_id: self.tenant_id.clone(),
                subscription_id: self.subscription_id.clone(),
                resource_group: self.resource_group.clone(),
                location: self.location.clone(),
                deployment_name: self.deployment_name.clone(),
            },
        };

        let snapshot = snapshot_deployment(&engine, &source, cancel).await?;
        let text = serde_json::to_string_pretty(&snapshot)?;

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, text)
                    .await
                    .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
                info!(
                    output = %path.display(),
                    resources = snapshot.predicted_resources.len(),
                    "snapshot written"
                );
            }
            None => println!("{text}"),
        }
        Ok(())
    }
}
