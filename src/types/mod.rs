//! Resource type model: an arena-based graph of type nodes.
//!
//! A resource type definition describes the legal JSON body of one cloud
//! resource kind at one API version. Definitions arrive as a closed set of
//! type-tree variants; shared and cyclic subtrees are expressed by index
//! into the owning [`TypeGraph`] rather than by pointer, so node identity
//! is a stable [`TypeRef`] and the schema compiler stays a pure function
//! of `(graph, root)`.
//!
//! The enum is deliberately exhaustive with no escape hatch: adding a new
//! variant fails to compile until every consumer handles it.

pub mod index;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use index::{TypeEntry, TypeIndex};

/// Stable handle to a node in a [`TypeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(pub u32);

impl TypeRef {
    /// The arena slot this reference points at.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One property of an object or discriminated-object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Type of the property's value.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Whether the property must be present in a valid body.
    #[serde(default)]
    pub required: bool,
    /// Read-only properties are service-populated and excluded from the
    /// writable schema entirely.
    #[serde(default)]
    pub read_only: bool,
}

/// The closed set of type-tree variants.
///
/// Property and variant mappings preserve declaration order; that order is
/// part of the compiled schema contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type", rename_all = "camelCase")]
pub enum TypeNode {
    /// Any string.
    String,
    /// Exactly one string value.
    #[serde(rename_all = "camelCase")]
    StringLiteral {
        /// The literal value.
        value: String,
    },
    /// One of several alternatives, in declared order.
    #[serde(rename_all = "camelCase")]
    Union {
        /// Member types, order-significant.
        elements: Vec<TypeRef>,
    },
    /// Integral number.
    Integer,
    /// Boolean.
    Boolean,
    /// Homogeneous array.
    #[serde(rename_all = "camelCase")]
    Array {
        /// Element type.
        item_type: TypeRef,
    },
    /// Object with named properties. A non-empty `name` makes the node
    /// definable: it is hoisted into the schema's definitions table and
    /// referenced by `$ref` at every occurrence.
    #[serde(rename_all = "camelCase")]
    Object {
        /// Definition name, when the type is named.
        #[serde(default)]
        name: Option<String>,
        /// Property map in declaration order.
        #[serde(default)]
        properties: IndexMap<String, Property>,
    },
    /// Object discriminated into variants by a property value. Always
    /// named, therefore always definable.
    #[serde(rename_all = "camelCase")]
    DiscriminatedObject {
        /// Definition name.
        name: String,
        /// Properties common to every variant, in declaration order.
        #[serde(default)]
        base_properties: IndexMap<String, Property>,
        /// Discriminator value to variant type, in declaration order.
        #[serde(default)]
        variants: IndexMap<String, TypeRef>,
    },
    /// Unconstrained.
    Any,
    /// JSON null.
    Null,
}

/// Arena owning the nodes of one resource type definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
}

impl TypeGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its handle.
    pub fn add(&mut self, node: TypeNode) -> TypeRef {
        let reference = TypeRef(self.nodes.len() as u32);
        self.nodes.push(node);
        reference
    }

    /// The handle the next [`add`](Self::add) will return. Lets callers
    /// construct self-referential nodes before inserting them.
    pub fn next_ref(&self) -> TypeRef {
        TypeRef(self.nodes.len() as u32)
    }

    /// Resolves a handle.
    ///
    /// # Panics
    ///
    /// Panics on a dangling reference. A graph that survives
    /// [`check_refs`](Self::check_refs) cannot trigger this; a panic here
    /// is a contract violation by the graph's producer, not user input.
    pub fn node(&self, reference: TypeRef) -> &TypeNode {
        self.nodes.get(reference.index()).unwrap_or_else(|| {
            panic!(
                "dangling TypeRef {} in graph of {} nodes",
                reference.0,
                self.nodes.len()
            )
        })
    }

    /// Resolves a handle without panicking.
    pub fn get(&self, reference: TypeRef) -> Option<&TypeNode> {
        self.nodes.get(reference.index())
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Verifies every reference held by every node is in bounds, returning
    /// the first dangling index otherwise. Index loading runs this so that
    /// compilation can treat dangling references as unreachable.
    pub fn check_refs(&self) -> Result<(), u32> {
        let in_bounds = |r: TypeRef| -> Result<(), u32> {
            if r.index() < self.nodes.len() {
                Ok(())
            } else {
                Err(r.0)
            }
        };

        for node in &self.nodes {
            match node {
                TypeNode::Union { elements } => {
                    for element in elements {
                        in_bounds(*element)?;
                    }
                }
                TypeNode::Array { item_type } => in_bounds(*item_type)?,
                TypeNode::Object { properties, .. } => {
                    for property in properties.values() {
                        in_bounds(property.ty)?;
                    }
                }
                TypeNode::DiscriminatedObject {
                    base_properties,
                    variants,
                    ..
                } => {
                    for property in base_properties.values() {
                        in_bounds(property.ty)?;
                    }
                    for variant in variants.values() {
                        in_bounds(*variant)?;
                    }
                }
                TypeNode::String
                | TypeNode::StringLiteral { .. }
                | TypeNode::Integer
                | TypeNode::Boolean
                | TypeNode::Any
                | TypeNode::Null => {}
            }
        }
        Ok(())
    }
}
