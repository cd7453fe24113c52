//! Global constants used throughout the armsnap codebase.
//!
//! Wire-contract markers and corpus layout conventions live here so the
//! processor, assembler, and CLI all agree on them.

/// Deployment schema version passed to the expansion engine.
pub const EXPANSION_SCHEMA_VERSION: &str = "2025-04-01";

/// Deployment scope passed to the expansion engine. Snapshots are always
/// synthesized at resource-group scope.
pub const RESOURCE_GROUP_SCOPE: &str = "resourceGroup";

/// Marker that must appear in a template's `$schema` URI for the template
/// to be treated as a deployment template (matched case-insensitively).
pub const DEPLOYMENT_TEMPLATE_SCHEMA_MARKER: &str = "/deploymenttemplate.json";

/// Descriptor file that marks one corpus entry.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Template file expected next to each corpus descriptor.
pub const TEMPLATE_FILE_NAME: &str = "azuredeploy.json";

/// Parameters file expected next to each corpus descriptor.
pub const PARAMETERS_FILE_NAME: &str = "azuredeploy.parameters.json";

/// Sibling file the processor writes next to each processed template.
pub const SNAPSHOT_FILE_NAME: &str = "azuredeploy.snapshot.json";

/// Default URI prefix for corpus entries; combined with the descriptor's
/// corpus-relative path to form the stable source URI that snapshot ids
/// are derived from.
pub const DEFAULT_CORPUS_BASE_URI: &str =
    "https://github.com/Azure/azure-quickstart-templates/blob/master";

/// Environment variable consulted for the expansion engine command when
/// `--engine` is not passed.
pub const ENGINE_ENV_VAR: &str = "ARMSNAP_ENGINE";

/// Default bound on concurrently processed corpus sources.
pub const DEFAULT_MAX_PARALLEL: usize = 8;
