//! Error handling for armsnap.
//!
//! Two layers, following the same split the rest of the crate's operations
//! use for results:
//! 1. [`ArmsnapError`] - strongly-typed failure cases, so callers can match
//!    on what went wrong (the batch processor downgrades per-source failures
//!    to logged skips; the CLI turns lookup misses into suggestion lists).
//! 2. [`ErrorContext`] - a display wrapper that adds an actionable
//!    suggestion and optional details for terminal output.
//!
//! Unresolvable deployment values are deliberately *not* represented here:
//! a value that is merely unknown at preview time is a
//! [`SymbolicValue::Unresolved`](crate::symbolic::SymbolicValue) variant,
//! never an error.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for armsnap operations.
#[derive(Error, Debug)]
pub enum ArmsnapError {
    /// The resource type exists in the index, but not at the requested API
    /// version. Carries every version the index does know for the type.
    #[error(
        "the specified API version '{api_version}' for resource type '{resource_type}' was not found. Possible api versions: '{}'",
        .known_versions.join("', '")
    )]
    UnknownApiVersion {
        /// Requested resource type (e.g. `Microsoft.KeyVault/vaults`).
        resource_type: String,
        /// Requested API version (e.g. `2024-11-01`).
        api_version: String,
        /// API versions the index knows for this resource type.
        known_versions: Vec<String>,
    },

    /// The resource type is absent from the index at any API version.
    /// Carries the closest alternatives: the provider's other types when
    /// the provider namespace is known, otherwise nearest-name matches.
    #[error(
        "the specified resource type '{resource_type}@{api_version}' was not found{}",
        format_suggestions(.suggestions)
    )]
    UnknownResourceType {
        /// Requested resource type.
        resource_type: String,
        /// Requested API version.
        api_version: String,
        /// Candidate resource types, best match first.
        suggestions: Vec<String>,
    },

    /// A resource type index file could not be read or deserialized.
    #[error("failed to load type index '{path}': {reason}")]
    TypeIndexError {
        /// Path of the index file.
        path: String,
        /// Parse or I/O failure description.
        reason: String,
    },

    /// A type graph entry referenced a node slot that does not exist in
    /// its arena. This is a defect in whatever produced the graph, not
    /// user input, and index loading rejects the entry up front.
    #[error("type graph entry '{entry}' references node {index} out of {len}")]
    MalformedTypeGraph {
        /// Index key of the offending entry.
        entry: String,
        /// The dangling node index.
        index: u32,
        /// Number of nodes actually present.
        len: usize,
    },

    /// Template text failed to parse as a deployment template document.
    #[error("failed to parse template '{path}': {reason}")]
    TemplateParse {
        /// Source path (or `<inline>` for non-file input).
        path: String,
        /// Parse failure description.
        reason: String,
    },

    /// Parameters file text failed to parse.
    #[error("failed to parse parameters file '{path}': {reason}")]
    ParameterFileParse {
        /// Source path.
        path: String,
        /// Parse failure description.
        reason: String,
    },

    /// The template parsed, but its `$schema` is not a deployment-template
    /// schema URI.
    #[error("'{path}' is not a deployment template (schema: '{schema}')")]
    NotADeploymentTemplate {
        /// Source path.
        path: String,
        /// The `$schema` value that failed the check.
        schema: String,
    },

    /// No expansion engine command was configured for an operation that
    /// needs one.
    #[error("no expansion engine configured")]
    EngineNotConfigured,

    /// The expansion engine process could not be started.
    #[error("failed to start expansion engine '{command}': {reason}")]
    EngineSpawnFailed {
        /// The command line that was attempted.
        command: String,
        /// Spawn failure description.
        reason: String,
    },

    /// The expansion engine ran but reported failure (non-zero exit).
    #[error("expansion engine failed: {reason}")]
    ExpansionFailed {
        /// Exit status and captured stderr, as available.
        reason: String,
    },

    /// The expansion engine exited successfully but its output was not a
    /// valid expansion result document.
    #[error("invalid expansion engine response: {reason}")]
    EngineResponseInvalid {
        /// Deserialization failure description.
        reason: String,
    },

    /// The operation observed the cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error wrapper for [`std::io::Error`].
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper for [`serde_json::Error`].
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for wrapped errors from other operations.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(". Possible resource types: '{}'", suggestions.join("', '"))
    }
}

/// User-facing wrapper that pairs an error with an actionable suggestion.
///
/// Produced by [`user_friendly_error`] at the top of the CLI; `display`
/// writes the colored three-part message (error, details, suggestion) to
/// stderr the way the binary's error path expects.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error.
    pub error: anyhow::Error,
    /// One-line fix suggestion, when one is known.
    pub suggestion: Option<String>,
    /// Extra context that did not fit the error message itself.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wraps an error with no suggestion or details.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Attaches a fix suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attaches additional details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with color, including details and
    /// suggestion when present.
    pub fn display(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self.error);
        if let Some(details) = &self.details {
            eprintln!("  {} {}", "Details:".yellow(), details);
        }
        if let Some(suggestion) = &self.suggestion {
            eprintln!("  {} {}", "Suggestion:".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }
        Ok(())
    }
}

/// Converts any error into an [`ErrorContext`] with a suggestion matched
/// to the failure, for display at the CLI boundary.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = match error.downcast_ref::<ArmsnapError>() {
        Some(ArmsnapError::EngineNotConfigured) => Some(format!(
            "pass --engine <command> or set the {} environment variable",
            crate::constants::ENGINE_ENV_VAR
        )),
        Some(ArmsnapError::EngineSpawnFailed { .. }) => {
            Some("check that the engine command is installed and on PATH".to_string())
        }
        Some(ArmsnapError::UnknownApiVersion { .. }) => {
            Some("retry with one of the listed API versions".to_string())
        }
        Some(ArmsnapError::UnknownResourceType { suggestions, .. })
            if !suggestions.is_empty() =>
        {
            Some("retry with one of the listed resource types".to_string())
        }
        Some(ArmsnapError::NotADeploymentTemplate { .. }) => Some(
            "only ARM deployment templates are supported; check the template's $schema".to_string(),
        ),
        _ => None,
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    ctx
}
