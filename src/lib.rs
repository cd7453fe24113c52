//! armsnap - deployment template snapshots and resource schemas without a
//! live cloud target.
//!
//! The toolkit previews infrastructure-as-code artifacts statically. Two
//! algorithmic cores drive everything:
//!
//! - **Type-to-Schema compiler** ([`schema`]): lowers a declarative
//!   resource type model ([`types`]) into a JSON-Schema-shaped document
//!   describing the legal shape of a resource body. Named and cyclic
//!   types are hoisted into a `definitions` table and referenced by
//!   `$ref`; cycles become forward references instead of infinite
//!   recursion.
//! - **Symbolic snapshot engine** ([`symbolic`], [`snapshot`]): statically
//!   expands a deployment template, standing in symbolic placeholders for
//!   values unknowable without a real deployment (tenant, subscription,
//!   resource group, defaultless parameters), and produces the predicted
//!   resource list plus diagnostics.
//!
//! Expansion of the template's expression graph itself is an external
//! collaborator behind the [`expansion::ExpansionEngine`] seam; the
//! production implementation drives an engine subprocess.
//!
//! # Core Modules
//!
//! - [`types`] - arena-based resource type model and the `type@apiVersion`
//!   index with suggestion-bearing lookup misses
//! - [`schema`] - the type-to-schema compiler
//! - [`symbolic`] - symbolic values, deployment-scope metadata, parameter
//!   binding
//! - [`template`] - thin deployment template / parameters file model
//! - [`expansion`] - the expansion engine wire contract and subprocess
//!   driver
//! - [`snapshot`] - snapshot entities, assembly, persistence, and the
//!   batch corpus processor
//! - [`cli`] - the `armsnap` command-line interface
//! - [`core`] - error model and cooperative cancellation
//!
//! # Example: compiling a schema
//!
//! ```rust
//! use armsnap::schema::compile;
//! use armsnap::types::{TypeGraph, TypeNode};
//!
//! let mut graph = TypeGraph::new();
//! let root = graph.add(TypeNode::String);
//! let schema = compile(&graph, root);
//! assert_eq!(schema["type"], "string");
//! ```

pub mod cli;
pub mod constants;
pub mod core;
pub mod expansion;
pub mod schema;
pub mod snapshot;
pub mod symbolic;
pub mod template;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
