//! Editor graph snapshot types and payload canonicalization.
//!
//! [`GraphSnapshot`] mirrors the graph state the editor owns: nodes keyed by
//! their editor id, each carrying a title and raw property strings, plus a
//! flat edge list. [`GraphPayload::from_snapshot`] canonicalizes a snapshot
//! into the shape the native compiler consumes: property wrappers are
//! flattened to bare values and edges are ordered by input slot.
//!
//! Canonicalization is a pure function of the snapshot and runs fresh on
//! every build; there is no incremental diffing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node as the editor holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Node kind shown in the editor (e.g. "Input", "Constant").
    pub title: String,
    /// Raw property strings, in editor declaration order. Structured
    /// properties are JSON `{"type", "value"}` wrappers.
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

/// One edge as the editor holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    /// Source node key.
    pub from: String,
    /// Target node key.
    pub to: String,
    /// Input slot index on the target node.
    pub input: u32,
}

/// Immutable snapshot of the editor graph taken at build time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: IndexMap<String, NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

/// One node in the compiler payload: flattened properties plus the title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadNode {
    /// Bare property values, keyed by property name.
    #[serde(flatten)]
    pub properties: IndexMap<String, Value>,
    pub title: String,
}

/// Compiler-ready graph payload.
///
/// Produced fresh per build and immutable once sent. Node insertion order
/// and edge order are both meaningful: the native compiler is
/// order-sensitive for multi-input operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: IndexMap<String, PayloadNode>,
    pub edges: Vec<EdgeSnapshot>,
}

/// Typed wrapper the editor stores structured property values in.
#[derive(Debug, Deserialize)]
struct TypedProperty {
    #[serde(rename = "type")]
    _type_name: String,
    value: Value,
}

/// Unwraps a `{"type", "value"}` property wrapper down to its bare value.
/// Strings that do not parse as a wrapper pass through unchanged.
fn flatten_property(raw: &str) -> Value {
    match serde_json::from_str::<TypedProperty>(raw) {
        Ok(property) => property.value,
        Err(_) => Value::String(raw.to_owned()),
    }
}

impl GraphPayload {
    /// Canonicalizes a snapshot into a compiler-ready payload.
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        let nodes = snapshot
            .nodes
            .iter()
            .map(|(key, node)| {
                let properties = node
                    .properties
                    .iter()
                    .map(|(name, raw)| (name.clone(), flatten_property(raw)))
                    .collect();
                (
                    key.clone(),
                    PayloadNode {
                        properties,
                        title: node.title.clone(),
                    },
                )
            })
            .collect();

        let mut edges = snapshot.edges.clone();
        // Stable sort: ties keep their editor order.
        edges.sort_by_key(|edge| edge.input);

        GraphPayload { nodes, edges }
    }

    /// JSON encoding sent to the native compiler.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
