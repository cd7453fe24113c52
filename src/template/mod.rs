//! Thin deployment-template model.
//!
//! Only what the snapshot pipeline itself reads is typed: the `$schema`
//! URI (to gate processing on real deployment templates), the declared
//! parameters (to drive symbolic binding), and the content version. The
//! template's expression graph stays an opaque JSON document; expanding it
//! is the external engine's job, and the full document is handed over
//! verbatim.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::constants::DEPLOYMENT_TEMPLATE_SCHEMA_MARKER;
use crate::core::ArmsnapError;

/// One declared template parameter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    /// Declared parameter type, e.g. `string`, `securestring`.
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    /// Declared default. A parameter with a default is left unbound; the
    /// engine applies the default during expansion.
    #[serde(default)]
    pub default_value: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateHeader {
    #[serde(rename = "$schema", default)]
    schema: Option<String>,
    #[serde(default)]
    content_version: Option<String>,
    #[serde(default)]
    parameters: IndexMap<String, ParameterDefinition>,
}

/// A parsed deployment template: typed header plus the verbatim document.
#[derive(Debug, Clone)]
pub struct Template {
    document: Value,
    schema: String,
    content_version: Option<String>,
    parameters: IndexMap<String, ParameterDefinition>,
}

impl Template {
    /// Parses template text.
    pub fn parse(text: &str) -> Result<Self, ArmsnapError> {
        Self::parse_internal(text, "<inline>")
    }

    /// Reads and parses a template file.
    pub fn load(path: &Path) -> Result<Self, ArmsnapError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| ArmsnapError::TemplateParse {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        Self::parse_internal(&text, &display)
    }

    fn parse_internal(text: &str, path: &str) -> Result<Self, ArmsnapError> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| ArmsnapError::TemplateParse {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        let header: TemplateHeader =
            serde_json::from_value(document.clone()).map_err(|e| ArmsnapError::TemplateParse {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            document,
            schema: header.schema.unwrap_or_default(),
            content_version: header.content_version,
            parameters: header.parameters,
        })
    }

    /// The template's `$schema` URI (empty when absent).
    pub fn schema_uri(&self) -> &str {
        &self.schema
    }

    /// Whether the `$schema` marks this as an ARM deployment template.
    pub fn is_deployment_template(&self) -> bool {
        self.schema
            .to_lowercase()
            .contains(DEPLOYMENT_TEMPLATE_SCHEMA_MARKER)
    }

    /// Declared `contentVersion`, when present.
    pub fn content_version(&self) -> Option<&str> {
        self.content_version.as_deref()
    }

    /// Declared parameters in declaration order.
    pub fn parameters(&self) -> &IndexMap<String, ParameterDefinition> {
        &self.parameters
    }

    /// The full template document, verbatim.
    pub fn document(&self) -> &Value {
        &self.document
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ParameterEntry {
    #[serde(default)]
    value: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ParametersHeader {
    #[serde(default)]
    parameters: IndexMap<String, ParameterEntry>,
}

/// A parsed deployment-parameters file.
///
/// Entries carrying a concrete `value` are surfaced; reference-style
/// entries (secrets resolved at deploy time) have no concrete value at
/// preview time and are simply absent from [`values`](Self::values); the
/// binder then synthesizes a placeholder for them.
#[derive(Debug, Clone, Default)]
pub struct ParametersFile {
    values: IndexMap<String, Value>,
}

impl ParametersFile {
    /// A parameters file supplying nothing, for sources that ship none.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses parameters-file text.
    pub fn parse(text: &str) -> Result<Self, ArmsnapError> {
        Self::parse_internal(text, "<inline>")
    }

    /// Reads and parses a parameters file.
    pub fn load(path: &Path) -> Result<Self, ArmsnapError> {
        let display = path.display().to_string();
        let text =
            std::fs::read_to_string(path).map_err(|e| ArmsnapError::ParameterFileParse {
                path: display.clone(),
                reason: e.to_string(),
            })?;
        Self::parse_internal(&text, &display)
    }

    fn parse_internal(text: &str, path: &str) -> Result<Self, ArmsnapError> {
        let header: ParametersHeader =
            serde_json::from_str(text).map_err(|e| ArmsnapError::ParameterFileParse {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let values = header
            .parameters
            .into_iter()
            .filter_map(|(name, entry)| entry.value.map(|value| (name, value)))
            .collect();
        Ok(Self { values })
    }

    /// Concrete parameter values by name.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }
}
