//! `armsnap schema` - compile a resource type into a JSON schema.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::schema::compile;
use crate::types::TypeIndex;

/// Compile a resource type definition into a JSON schema.
#[derive(Debug, Args)]
pub struct SchemaCommand {
    /// Resource reference as `<resourceType>@<apiVersion>`
    /// (e.g. `Microsoft.KeyVault/vaults@2024-11-01`).
    #[arg(value_name = "TYPE@API_VERSION")]
    pub resource: String,

    /// Resource type index file to resolve the reference against.
    #[arg(long, value_name = "FILE")]
    pub index: PathBuf,

    /// Write the schema here instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl SchemaCommand {
    /// Looks the type up, compiles it, and emits the pretty-printed
    /// schema.
    pub async fn execute(self) -> Result<()> {
        let Some((resource_type, api_version)) = self.resource.split_once('@') else {
            bail!(
                "invalid resource reference '{}': expected <resourceType>@<apiVersion>",
                self.resource
            );
        };

        let index = TypeIndex::load(&self.index)?;
        let entry = index.lookup(resource_type, api_version)?;
        let schema = compile(&entry.nodes, entry.body);
        let text = serde_json::to_string_pretty(&Value::Object(schema))?;

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, text)
                    .await
                    .with_context(|| format!("failed to write schema to {}", path.display()))?;
                info!(output = %path.display(), resource = %self.resource, "schema written");
            }
            None => println!("{text}"),
        }
        Ok(())
    }
}
