//! Type-to-Schema compiler.
//!
//! Lowers a [`TypeGraph`] node into a JSON-Schema-shaped document that
//! constrains the legal shape of a resource body. Named object types and
//! discriminated objects are hoisted into a `definitions` table and
//! referenced by `$ref`; everything else is inlined at every occurrence.
//!
//! [`compile`] is a pure function of `(graph, root)`. All bookkeeping (name
//! assignment, emitted definitions, the in-progress set that breaks cycles)
//! lives in a [`DefinitionTable`] scoped to the single call, so concurrent
//! compilations share nothing.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value, json};

use crate::types::{Property, TypeGraph, TypeNode, TypeRef};

/// Per-compilation bookkeeping: assigned definition names, emitted
/// definitions, and the set of definitions currently being expanded.
#[derive(Default)]
struct DefinitionTable {
    names: HashMap<TypeRef, String>,
    definitions: Map<String, Value>,
    expanding: HashSet<TypeRef>,
}

impl DefinitionTable {
    /// Returns the definition name for a definable node, assigning one on
    /// first sight. Collisions against previously assigned names resolve
    /// by suffixing `_1`, `_2`, ... until unique; the counter never reuses
    /// a freed number within one compilation.
    fn definition_name(&mut self, graph: &TypeGraph, reference: TypeRef) -> String {
        if let Some(existing) = self.names.get(&reference) {
            return existing.clone();
        }

        let base_name = match graph.node(reference) {
            TypeNode::Object { name: Some(name), .. } => name.clone(),
            TypeNode::DiscriminatedObject { name, .. } => name.clone(),
            other => unreachable!("node is not definable: {other:?}"),
        };

        let mut unique = base_name.clone();
        let mut suffix = 1u32;
        while self.names.values().any(|taken| *taken == unique) {
            unique = format!("{base_name}_{suffix}");
            suffix += 1;
        }

        self.names.insert(reference, unique.clone());
        unique
    }
}

/// Whether a node is hoisted into the definitions table: objects with a
/// non-empty name, and discriminated objects (always named).
fn is_definable(node: &TypeNode) -> bool {
    match node {
        TypeNode::Object { name: Some(name), .. } => !name.is_empty(),
        TypeNode::DiscriminatedObject { .. } => true,
        _ => false,
    }
}

/// Compiles the type rooted at `root` into a schema document.
///
/// If any named type was hoisted during compilation, the root schema gains
/// a `definitions` key holding the table; otherwise the root schema is
/// returned unwrapped.
///
/// # Panics
///
/// Panics on a dangling [`TypeRef`]: a contract violation by the graph's
/// producer, not a user-facing error.
pub fn compile(graph: &TypeGraph, root: TypeRef) -> Map<String, Value> {
    let mut table = DefinitionTable::default();
    let mut schema = match lower_ref(graph, root, &mut table) {
        Value::Object(map) => map,
        other => unreachable!("lowering produced a non-object schema: {other:?}"),
    };

    if !table.definitions.is_empty() {
        schema.insert("definitions".to_string(), Value::Object(table.definitions));
    }
    schema
}

/// Lowers a reference, routing definable nodes through the definitions
/// table and returning `$ref` markers for them.
fn lower_ref(graph: &TypeGraph, reference: TypeRef, table: &mut DefinitionTable) -> Value {
    let node = graph.node(reference);
    if !is_definable(node) {
        return lower_node(graph, node, table);
    }

    let name = table.definition_name(graph, reference);
    let ref_value = json!({ "$ref": format!("#/definitions/{name}") });

    // Already mid-expansion: returning the bare reference here is what
    // turns a cyclic graph into a forward reference instead of infinite
    // recursion.
    if table.expanding.contains(&reference) {
        return ref_value;
    }

    if !table.definitions.contains_key(&name) {
        table.expanding.insert(reference);
        let definition = lower_node(graph, graph.node(reference), table);
        table.definitions.insert(name, definition);
        table.expanding.remove(&reference);
    }

    ref_value
}

/// Lowers one node body. Exhaustive over the closed variant set; a new
/// variant cannot compile until it is handled here.
fn lower_node(graph: &TypeGraph, node: &TypeNode, table: &mut DefinitionTable) -> Value {
    match node {
        TypeNode::String => json!({ "type": "string" }),
        TypeNode::StringLiteral { value } => json!({ "type": "string", "enum": [value] }),
        TypeNode::Union { elements } => {
            let literals: Option<Vec<&str>> = elements
                .iter()
                .map(|e| match graph.node(*e) {
                    TypeNode::StringLiteral { value } => Some(value.as_str()),
                    _ => None,
                })
                .collect();

            // A union of nothing but string literals collapses to a single
            // enum, in element order, duplicates kept as-is.
            if let Some(values) = literals {
                json!({ "type": "string", "enum": values })
            } else {
                let alternatives: Vec<Value> = elements
                    .iter()
                    .map(|e| lower_ref(graph, *e, table))
                    .collect();
                json!({ "oneOf": alternatives })
            }
        }
        TypeNode::Integer => json!({ "type": "number" }),
        TypeNode::Boolean => json!({ "type": "boolean" }),
        TypeNode::Array { item_type } => {
            json!({ "type": "array", "items": lower_ref(graph, *item_type, table) })
        }
        TypeNode::Object { properties, .. } => {
            Value::Object(lower_object_body(graph, properties, table, None))
        }
        TypeNode::DiscriminatedObject {
            base_properties,
            variants,
            ..
        } => {
            let members: Vec<Value> = variants
                .values()
                .map(|v| lower_ref(graph, *v, table))
                .collect();
            Value::Object(lower_object_body(
                graph,
                base_properties,
                table,
                Some(members),
            ))
        }
        TypeNode::Any => json!({}),
        TypeNode::Null => json!({ "type": "null" }),
    }
}

/// Shared lowering for object and discriminated-object bodies: read-only
/// properties are dropped entirely, `required` lists the required names
/// among the writable set and is omitted when empty.
fn lower_object_body(
    graph: &TypeGraph,
    properties: &indexmap::IndexMap<String, Property>,
    table: &mut DefinitionTable,
    one_of: Option<Vec<Value>>,
) -> Map<String, Value> {
    let writable: Vec<(&String, &Property)> =
        properties.iter().filter(|(_, p)| !p.read_only).collect();

    let mut lowered = Map::new();
    for (name, property) in &writable {
        lowered.insert((*name).clone(), lower_ref(graph, property.ty, table));
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(lowered));
    if let Some(members) = one_of {
        schema.insert("oneOf".to_string(), Value::Array(members));
    }

    let required: Vec<Value> = writable
        .iter()
        .filter(|(_, p)| p.required)
        .map(|(name, _)| json!(name))
        .collect();
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }

    schema
}
