//! The template expansion engine boundary.
//!
//! Expansion of a template's expression graph and nested deployments is an
//! external collaborator, never implemented here. This module defines the
//! wire contract ([`ExpandRequest`] in, [`ExpansionResult`] out) and the
//! [`ExpansionEngine`] seam the snapshot assembler drives. The production
//! implementation, [`CommandEngine`](command::CommandEngine), talks to an
//! engine subprocess over stdin/stdout; tests plug in stubs.
//!
//! With preflight enabled the engine is treated as a pure function of the
//! request (modulo placeholders) that never touches real cloud state.
//! Symbolic values travel structurally (see
//! [`SymbolicValue`](crate::symbolic::SymbolicValue)'s serialization);
//! engines embed unresolved values into produced resources using the
//! rendered `[unresolved('kind', 'key')]` form.

pub mod command;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{EXPANSION_SCHEMA_VERSION, RESOURCE_GROUP_SCOPE};
use crate::core::{ArmsnapError, CancelToken};
use crate::symbolic::{DeploymentMetadata, ParameterBindings};
use crate::template::Template;

pub use command::CommandEngine;

/// One expansion request: the template document plus the symbolic context
/// it is to be expanded under.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandRequest {
    /// Deployment schema version the engine should expand against.
    pub schema_version: String,
    /// Deployment scope; always resource group for snapshots.
    pub scope: String,
    /// The template document, verbatim.
    pub template: Value,
    /// Symbolic parameter bindings; parameters left to their defaults are
    /// absent.
    pub parameters: ParameterBindings,
    /// Deployment-scope metadata.
    pub root_metadata: DeploymentMetadata,
    /// Preflight mode: reference()-style functions resolve against
    /// predicted state only.
    pub preflight_enabled: bool,
}

impl ExpandRequest {
    /// Builds the standard snapshot request for a template and its
    /// symbolic context.
    pub fn new(
        template: &Template,
        parameters: ParameterBindings,
        root_metadata: DeploymentMetadata,
    ) -> Self {
        Self {
            schema_version: EXPANSION_SCHEMA_VERSION.to_string(),
            scope: RESOURCE_GROUP_SCOPE.to_string(),
            template: template.document().clone(),
            parameters,
            root_metadata,
            preflight_enabled: true,
        }
    }
}

/// A non-ARM (data-plane) resource description reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensibleResource {
    /// Extension resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Extension API version.
    pub api_version: String,
    /// Identifying properties, when reported.
    #[serde(default)]
    pub identifiers: Option<Value>,
    /// Configuration properties, when reported.
    #[serde(default)]
    pub properties: Option<Value>,
}

/// One diagnostic reported during expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// What the diagnostic is about (resource path, parameter, ...).
    pub target: String,
    /// Severity, engine vocabulary (e.g. `Warning`, `Error`).
    pub level: String,
    /// Engine diagnostic code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.target, self.level, self.code, self.message
        )
    }
}

/// Everything the engine reports for one expansion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionResult {
    /// Preflight-style ARM resource descriptions, engine order.
    #[serde(default)]
    pub preflight_resources: Vec<Value>,
    /// Extension (data-plane) resource descriptions, engine order.
    #[serde(default)]
    pub extensible_resources: Vec<ExtensibleResource>,
    /// Diagnostics, engine order.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// The expansion engine seam.
#[async_trait]
pub trait ExpansionEngine: Send + Sync {
    /// Expands a template under the given symbolic context.
    ///
    /// Implementations observe `cancel` and return
    /// [`ArmsnapError::Cancelled`] promptly once it fires.
    async fn expand(
        &self,
        request: &ExpandRequest,
        cancel: &CancelToken,
    ) -> Result<ExpansionResult, ArmsnapError>;
}
