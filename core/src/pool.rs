//! Pool specifications stored as an arena of nodes.
//!
//! RULE: Nodes refer to each other only through `NodeId`. A node may point
//! at any other node in the same arena, itself included; termination is
//! the evaluator's depth guard, not the arena's concern.
//!
//! JSON specs compile as follows:
//!   - top level: a single object, a literal, or an array mixing both.
//!     Literals become `none` nodes, arrays and other non-objects inside
//!     the top-level array are dropped.
//!   - inside `data`: only objects with `"is_pool": true` become nodes;
//!     other objects and arrays stay plain values.
//!   - `concat.data.value`: compiled like a top-level sequence.

use crate::{kind::PoolKind, modifier::Modifier, value::Value};
use std::collections::BTreeMap;

/// Field marking a nested object as a pool.
pub const POOL_MARKER: &str = "is_pool";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// `{table, name}`: pull `name` from a registry table into a data field.
/// An absent table means the engine's default import table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    pub table: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct PoolNode {
    pub kind: PoolKind,
    pub data: BTreeMap<String, Value>,
    pub modifier: Option<Modifier>,
    /// Cleared on first resolution.
    pub import: BTreeMap<String, ImportDirective>,
}

impl PoolNode {
    pub fn new(kind: PoolKind) -> Self {
        Self {
            kind,
            data: BTreeMap::new(),
            modifier: None,
            import: BTreeMap::new(),
        }
    }

    /// A `none` node yielding `value` verbatim.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(PoolKind::None).with("value", value)
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.data.insert(field.to_string(), value.into());
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    pub fn with_import(mut self, field: &str, table: Option<&str>, name: &str) -> Self {
        self.import.insert(
            field.to_string(),
            ImportDirective {
                table: table.map(str::to_string),
                name: name.to_string(),
            },
        );
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PoolArena {
    nodes: Vec<PoolNode>,
}

impl PoolArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a JSON spec into a fresh arena, returning it with the
    /// top-level sequence.
    pub fn from_json(spec: &serde_json::Value) -> (Self, Vec<NodeId>) {
        let mut arena = Self::new();
        let roots = arena.compile_sequence(spec);
        (arena, roots)
    }

    pub fn push(&mut self, node: PoolNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&PoolNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut PoolNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Normalize a top-level spec into an ordered list of nodes.
    pub fn compile_sequence(&mut self, spec: &serde_json::Value) -> Vec<NodeId> {
        match spec {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| self.compile_sequence_item(item))
                .collect(),
            other => self.compile_sequence_item(other).into_iter().collect(),
        }
    }

    fn compile_sequence_item(&mut self, item: &serde_json::Value) -> Option<NodeId> {
        match item {
            serde_json::Value::String(_) | serde_json::Value::Number(_) => {
                Some(self.push(PoolNode::literal(Value::from_json(item))))
            }
            serde_json::Value::Object(map) => Some(self.compile_node(map)),
            _ => None,
        }
    }

    /// Compile one pool object. Missing `type` yields an unregistered node.
    pub fn compile_node(&mut self, map: &serde_json::Map<String, serde_json::Value>) -> NodeId {
        let kind = map
            .get("type")
            .and_then(serde_json::Value::as_str)
            .map(PoolKind::from_tag)
            .unwrap_or_else(|| PoolKind::Unregistered(String::new()));

        let mut node = PoolNode::new(kind);

        if let Some(serde_json::Value::Object(data)) = map.get("data") {
            for (field, raw) in data {
                let value = if node.kind == PoolKind::Concat && field == "value" {
                    match raw {
                        serde_json::Value::Array(_) => Value::List(
                            self.compile_sequence(raw).into_iter().map(Value::Pool).collect(),
                        ),
                        _ => self.compile_value(raw),
                    }
                } else {
                    self.compile_value(raw)
                };
                node.data.insert(field.clone(), value);
            }
        }

        match map.get("modifier") {
            Some(serde_json::Value::String(name)) => match Modifier::from_name(name) {
                Some(modifier) => node.modifier = Some(modifier),
                None => log::warn!("pool {}: unknown modifier '{name}' ignored", node.kind),
            },
            Some(serde_json::Value::Null) | None => {}
            Some(other) => log::warn!("pool {}: modifier must be a name, got {other}", node.kind),
        }

        if let Some(serde_json::Value::Object(imports)) = map.get("import") {
            for (field, directive) in imports {
                let Some(name) = directive.get("name").and_then(serde_json::Value::as_str) else {
                    log::warn!("pool {}: import for '{field}' has no name", node.kind);
                    continue;
                };
                let table = directive
                    .get("table")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string);
                node.import.insert(
                    field.clone(),
                    ImportDirective {
                        table,
                        name: name.to_string(),
                    },
                );
            }
        }

        self.push(node)
    }

    /// Compile a data field value, turning marked objects into nodes.
    pub fn compile_value(&mut self, json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Object(map) if is_pool(json) => Value::Pool(self.compile_node(map)),
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.compile_value(v)))
                    .collect(),
            ),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(|v| self.compile_value(v)).collect())
            }
            scalar => Value::from_json(scalar),
        }
    }
}

/// An object (not an array) whose marker field is exactly `true`.
pub fn is_pool(json: &serde_json::Value) -> bool {
    json.as_object()
        .and_then(|map| map.get(POOL_MARKER))
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}
