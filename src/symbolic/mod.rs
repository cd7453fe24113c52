//! Symbolic values: partial evaluation with first-class unknowns.
//!
//! A value that is merely unknown at preview time (tenant id, a parameter
//! with no default) is not an error. It is reified as an
//! [`SymbolicValue::Unresolved`] placeholder tagged with a `(kind, key)`
//! pair, and propagates through concatenation and property access like any
//! other value, surfacing intact in the final output as a
//! function-call-shaped marker instead of failing evaluation or collapsing
//! to a blank.
//!
//! The enum is exhaustive; serialization and rendering both pattern-match
//! the full set, so a new variant cannot be added silently.

pub mod context;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use context::{
    DeploymentMetadata, DeploymentOverrides, ParameterBindings, ScopeRecord, build_metadata,
    bind_parameters,
};

/// A concrete-or-symbolic expression value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolicValue {
    /// A fully concrete JSON value.
    Literal(Value),
    /// A value unknowable without a real deployment, tagged with the scope
    /// kind and field (or `("parameter", <name>)`) it stands in for.
    Unresolved {
        /// Placeholder kind, e.g. `tenant`, `subscription`, `parameter`.
        kind: String,
        /// Field or name within the kind, e.g. `tenantId`.
        key: String,
    },
    /// Lazy string concatenation. Evaluated only as far as its literal
    /// prefix/suffix runs allow; an embedded placeholder keeps the whole
    /// expression symbolic rather than collapsing to a token-bearing
    /// string.
    Concat(Vec<SymbolicValue>),
    /// Object whose members are evaluated independently.
    Object(IndexMap<String, SymbolicValue>),
    /// Array whose elements are evaluated independently.
    Array(Vec<SymbolicValue>),
}

impl SymbolicValue {
    /// Concrete string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Value::String(value.into()))
    }

    /// Concrete JSON literal.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Placeholder for a value unknowable at preview time.
    pub fn unresolved(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Unresolved {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Concatenation over the parts, folded as far as literals allow:
    /// adjacent string literals merge, and a concatenation that folds to a
    /// single part becomes that part. Folding never crosses a placeholder.
    pub fn concat(parts: Vec<SymbolicValue>) -> Self {
        let mut folded: Vec<SymbolicValue> = Vec::with_capacity(parts.len());
        for part in parts {
            if let (
                Some(SymbolicValue::Literal(Value::String(accumulated))),
                SymbolicValue::Literal(Value::String(next)),
            ) = (folded.last_mut(), &part)
            {
                accumulated.push_str(next);
                continue;
            }
            folded.push(part);
        }

        if folded.len() == 1 {
            folded.into_iter().next().unwrap()
        } else {
            Self::Concat(folded)
        }
    }

    /// True when no placeholder occurs anywhere in the value.
    pub fn is_resolved(&self) -> bool {
        match self {
            Self::Literal(_) => true,
            Self::Unresolved { .. } => false,
            Self::Concat(parts) | Self::Array(parts) => parts.iter().all(Self::is_resolved),
            Self::Object(members) => members.values().all(Self::is_resolved),
        }
    }

    /// Renders the value to plain JSON for output. Concrete values render
    /// as themselves; anything symbolic renders as a bracketed expression
    /// string (`[unresolved('parameter', 'adminPassword')]`,
    /// `[concat('/tenants/', unresolved('tenant', 'tenantId'))]`) so the
    /// marker survives recognizably instead of being dropped.
    pub fn render(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(name, member)| (name.clone(), member.render()))
                    .collect(),
            ),
            Self::Array(elements) => {
                Value::Array(elements.iter().map(Self::render).collect())
            }
            Self::Unresolved { .. } | Self::Concat(_) => {
                Value::String(format!("[{}]", self.expression_text()))
            }
        }
    }

    /// The value as expression text, without the outer brackets.
    fn expression_text(&self) -> String {
        match self {
            Self::Literal(Value::String(text)) => {
                // Single quotes escape by doubling inside expression strings.
                format!("'{}'", text.replace('\'', "''"))
            }
            Self::Literal(other) => other.to_string(),
            Self::Unresolved { kind, key } => {
                format!("unresolved('{kind}', '{key}')")
            }
            Self::Concat(parts) => {
                let arguments: Vec<String> =
                    parts.iter().map(Self::expression_text).collect();
                format!("concat({})", arguments.join(", "))
            }
            Self::Object(members) => {
                let arguments: Vec<String> = members
                    .iter()
                    .flat_map(|(name, member)| {
                        [format!("'{name}'"), member.expression_text()]
                    })
                    .collect();
                format!("createObject({})", arguments.join(", "))
            }
            Self::Array(elements) => {
                let arguments: Vec<String> =
                    elements.iter().map(Self::expression_text).collect();
                format!("createArray({})", arguments.join(", "))
            }
        }
    }
}
