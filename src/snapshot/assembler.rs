//! Snapshot assembly: drive the expansion engine over a template and its
//! symbolic context, then normalize what comes back.
//!
//! Assembly does not catch engine failures; the caller decides whether a
//! failure is fatal (one-shot CLI) or a logged skip (batch processor).

use serde_json::{Value, json};

use crate::core::{ArmsnapError, CancelToken};
use crate::expansion::{ExpandRequest, ExpansionEngine, ExpansionResult};
use crate::snapshot::Snapshot;
use crate::symbolic::{
    DeploymentMetadata, DeploymentOverrides, ParameterBindings, bind_parameters, build_metadata,
};
use crate::template::{ParametersFile, Template};

/// One deployment to snapshot: template text, optional parameters text,
/// and whatever concrete scope values the caller knows.
#[derive(Debug, Clone, Default)]
pub struct DeploymentSource {
    /// Deployment template JSON text.
    pub template_text: String,
    /// Parameters file JSON text; `None` behaves as an empty parameters
    /// file.
    pub parameters_text: Option<String>,
    /// Concrete scope values, where known.
    pub overrides: DeploymentOverrides,
}

/// Parses a deployment source, builds its symbolic context, and assembles
/// the snapshot.
pub async fn snapshot_deployment(
    engine: &dyn ExpansionEngine,
    source: &DeploymentSource,
    cancel: &CancelToken,
) -> Result<Snapshot, ArmsnapError> {
    let template = Template::parse(&source.template_text)?;
    let parameters = match &source.parameters_text {
        Some(text) => ParametersFile::parse(text)?,
        None => ParametersFile::empty(),
    };

    let metadata = build_metadata(&source.overrides);
    let bindings = bind_parameters(&template, parameters.values());
    assemble(engine, &template, bindings, metadata, cancel).await
}

/// Invokes expansion and normalizes the result streams into a
/// [`Snapshot`].
pub async fn assemble(
    engine: &dyn ExpansionEngine,
    template: &Template,
    bindings: ParameterBindings,
    metadata: DeploymentMetadata,
    cancel: &CancelToken,
) -> Result<Snapshot, ArmsnapError> {
    let request = ExpandRequest::new(template, bindings, metadata);
    let result = engine.expand(&request, cancel).await?;
    Ok(normalize(result))
}

/// ARM resources first, extension resources appended; engine order
/// preserved within each group. Diagnostics flatten to their display
/// form.
fn normalize(result: ExpansionResult) -> Snapshot {
    let mut predicted_resources = result.preflight_resources;
    predicted_resources.extend(result.extensible_resources.into_iter().map(|resource| {
        json!({
            "type": resource.resource_type,
            "apiVersion": resource.api_version,
            "identifiers": resource.identifiers.unwrap_or(Value::Null),
            "properties": resource.properties.unwrap_or(Value::Null),
        })
    }));

    Snapshot {
        predicted_resources,
        diagnostics: result
            .diagnostics
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}
