//! Test doubles shared by unit and integration tests.
//!
//! Available to integration tests through the `test-utils` feature, the
//! same way the test suite is wired everywhere else in this workspace.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::core::{ArmsnapError, CancelToken};
use crate::expansion::{ExpandRequest, ExpansionEngine, ExpansionResult};
use crate::snapshot::{SnapshotWithMetadata, SnapshotWriter};

/// Resource type that makes [`StubEngine`] report an expansion failure.
pub const FAILING_RESOURCE_TYPE: &str = "Test/failures";

/// Minimal in-process expansion engine.
///
/// Walks the template's `resources` array, substituting any string of the
/// exact form `[parameters('<name>')]` with the bound symbolic value
/// (rendered), or with the declared default when the parameter is left
/// unbound. A resource of type [`FAILING_RESOURCE_TYPE`] makes the whole
/// expansion fail, which is how batch-resilience tests poison one source.
#[derive(Debug, Default, Clone)]
pub struct StubEngine;

impl StubEngine {
    fn substitute(value: &Value, request: &ExpandRequest) -> Value {
        match value {
            Value::String(text) => {
                if let Some(name) = text
                    .strip_prefix("[parameters('")
                    .and_then(|rest| rest.strip_suffix("')]"))
                {
                    if let Some(bound) = request.parameters.get(name) {
                        return bound.render();
                    }
                    if let Some(default) =
                        request.template["parameters"][name].get("defaultValue")
                    {
                        return default.clone();
                    }
                }
                value.clone()
            }
            Value::Array(elements) => Value::Array(
                elements
                    .iter()
                    .map(|element| Self::substitute(element, request))
                    .collect(),
            ),
            Value::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(name, member)| (name.clone(), Self::substitute(member, request)))
                    .collect(),
            ),
            _ => value.clone(),
        }
    }
}

#[async_trait]
impl ExpansionEngine for StubEngine {
    async fn expand(
        &self,
        request: &ExpandRequest,
        cancel: &CancelToken,
    ) -> Result<ExpansionResult, ArmsnapError> {
        if cancel.is_cancelled() {
            return Err(ArmsnapError::Cancelled);
        }

        let resources = request.template["resources"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        if resources
            .iter()
            .any(|resource| resource["type"] == FAILING_RESOURCE_TYPE)
        {
            return Err(ArmsnapError::ExpansionFailed {
                reason: "stub engine failure".to_string(),
            });
        }

        Ok(ExpansionResult {
            preflight_resources: resources
                .iter()
                .map(|resource| Self::substitute(resource, request))
                .collect(),
            ..Default::default()
        })
    }
}

/// Writer that collects envelopes in memory.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    entries: Mutex<Vec<SnapshotWithMetadata>>,
}

impl MemoryWriter {
    /// Fresh, empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, in write order.
    pub async fn entries(&self) -> Vec<SnapshotWithMetadata> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl SnapshotWriter for MemoryWriter {
    async fn write(&self, entry: &SnapshotWithMetadata) -> Result<(), ArmsnapError> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }
}
