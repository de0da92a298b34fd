//! Namespaced key/value registry used to inject external data into pools.
//!
//! RULES:
//!   - Table names are `namespace:id` (one or more `:id` parts, no empty
//!     parts). A bare name gets the registry's namespace prefixed.
//!   - An invalid table name turns every operation into a no-op.
//!   - Values cross the boundary by clone. Callers never hold references
//!     into stored state.
//!   - `set` deep-merges unless `fill` is requested. Arrays concatenate,
//!     skipping scalars already present.
//!   - Triggers fire synchronously, in registration order, after every
//!     successful `set` on their table whose key matches (or `*`).
//!     A trigger only sees `(key, value)`; it cannot reach back into the
//!     registry, so set-from-trigger cycles cannot be expressed.

use crate::error::{PoolError, PoolResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_NAMESPACE: &str = "xuansu";

/// Trigger key matching every key of a table.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Replace the stored value instead of merging into it.
    pub fill: bool,
    /// Do not fire triggers for this write.
    pub trigger_disable: bool,
}

impl SetOptions {
    pub fn overwrite() -> Self {
        Self {
            fill: true,
            ..Self::default()
        }
    }

    pub fn silent() -> Self {
        Self {
            trigger_disable: true,
            ..Self::default()
        }
    }
}

pub type TriggerId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerKey {
    Key(String),
    Any,
}

impl TriggerKey {
    pub fn parse(key: &str) -> Self {
        if key == WILDCARD {
            Self::Any
        } else {
            Self::Key(key.to_string())
        }
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Key(k) => k == key,
        }
    }
}

type TriggerAction = dyn FnMut(&str, &Value) + Send;

struct Trigger {
    id: TriggerId,
    table: String,
    key: TriggerKey,
    action: Box<TriggerAction>,
}

/// Shape of a `<data_dir>/registry/*.json` file.
///
/// `entries` maps keys to values directly; `items` plus `key` loads a list
/// keyed by one of its fields.
#[derive(Debug, Deserialize)]
struct TableFile {
    table: String,
    #[serde(default)]
    entries: Map<String, Value>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    items: Vec<Value>,
}

pub struct Registry {
    namespace: String,
    tables: BTreeMap<String, Map<String, Value>>,
    triggers: Vec<Trigger>,
    next_trigger_id: TriggerId,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            tables: BTreeMap::new(),
            triggers: Vec::new(),
            next_trigger_id: 1,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Fully qualified table name, or `None` when `name` is malformed.
    pub fn qualify(&self, name: &str) -> Option<String> {
        if name.contains(':') {
            is_qualified(name).then(|| name.to_string())
        } else if name.is_empty() {
            None
        } else {
            Some(format!("{}:{name}", self.namespace))
        }
    }

    /// Create an empty table if it does not exist yet.
    /// Returns the qualified name, or `None` for an invalid name.
    pub fn create_table(&mut self, name: &str) -> Option<String> {
        let qualified = self.qualify(name)?;
        self.tables.entry(qualified.clone()).or_default();
        Some(qualified)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.qualify(name)
            .is_some_and(|q| self.tables.contains_key(&q))
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn get(&self, table: &str, key: &str) -> Option<Value> {
        let qualified = self.qualify(table)?;
        self.tables.get(&qualified)?.get(key).cloned()
    }

    pub fn get_all(&self, table: &str) -> Option<Map<String, Value>> {
        let qualified = self.qualify(table)?;
        self.tables.get(&qualified).cloned()
    }

    /// Store `value` under `key`, creating the table on first write.
    /// Returns a copy of what is now stored, or `None` for an invalid
    /// table name.
    pub fn set(
        &mut self,
        table: &str,
        key: &str,
        value: Value,
        options: SetOptions,
    ) -> Option<Value> {
        let qualified = self.qualify(table)?;
        let entries = self.tables.entry(qualified.clone()).or_default();

        let stored = if options.fill || !entries.contains_key(key) {
            entries.insert(key.to_string(), value.clone());
            value
        } else {
            let existing = entries.get_mut(key)?;
            merge(existing, value);
            existing.clone()
        };

        if !options.trigger_disable {
            self.fire(&qualified, key, &stored);
        }
        Some(stored)
    }

    fn fire(&mut self, table: &str, key: &str, value: &Value) {
        for trigger in self
            .triggers
            .iter_mut()
            .filter(|t| t.table == table && t.key.matches(key))
        {
            log::debug!("registry: trigger {} on {table}/{key}", trigger.id);
            (trigger.action)(key, value);
        }
    }

    /// Look up `key` in `table` and use the result as a key into
    /// `target`. `on_success` receives the target value; `on_failure` runs
    /// when the first value is not a usable key or the target has no entry.
    pub fn redirect<S, F>(&self, table: &str, target: &str, key: &str, on_success: S, on_failure: F)
    where
        S: FnOnce(Value),
        F: FnOnce(),
    {
        match self.resolve_redirect(table, target, key) {
            Some(value) => on_success(value),
            None => on_failure(),
        }
    }

    pub fn resolve_redirect(&self, table: &str, target: &str, key: &str) -> Option<Value> {
        let second_key = scalar_key(&self.get(table, key)?)?;
        self.get(target, &second_key)
    }

    /// Register `action` for writes to `key` (or `*`) on `table`.
    /// Returns `None` for an invalid table name.
    pub fn on_change<F>(&mut self, table: &str, key: &str, action: F) -> Option<TriggerId>
    where
        F: FnMut(&str, &Value) + Send + 'static,
    {
        let table = self.qualify(table)?;
        let id = self.next_trigger_id;
        self.next_trigger_id += 1;
        self.triggers.push(Trigger {
            id,
            table,
            key: TriggerKey::parse(key),
            action: Box::new(action),
        });
        Some(id)
    }

    pub fn remove_trigger(&mut self, id: TriggerId) -> bool {
        let before = self.triggers.len();
        self.triggers.retain(|t| t.id != id);
        self.triggers.len() != before
    }

    /// Bulk `set`: each item is stored under the key `key_fn` derives from
    /// it. Items without a key are skipped. Returns how many were stored.
    pub fn load_with<I, F>(&mut self, table: &str, items: I, key_fn: F) -> usize
    where
        I: IntoIterator<Item = Value>,
        F: Fn(&Value) -> Option<String>,
    {
        let mut stored = 0;
        for item in items {
            let Some(key) = key_fn(&item) else {
                continue;
            };
            if self.set(table, &key, item, SetOptions::default()).is_some() {
                stored += 1;
            }
        }
        stored
    }

    /// Bulk `set` keyed by the scalar found at `field` in each item.
    pub fn load_by_field<I>(&mut self, table: &str, field: &str, items: I) -> usize
    where
        I: IntoIterator<Item = Value>,
    {
        self.load_with(table, items, |item| item.get(field).and_then(scalar_key))
    }

    /// Load one table file. Returns the number of entries stored.
    pub fn load_file(&mut self, path: &Path) -> PoolResult<usize> {
        let content = std::fs::read_to_string(path)?;
        let file: TableFile = serde_json::from_str(&content)?;
        if self.create_table(&file.table).is_none() {
            return Err(PoolError::InvalidTableName { name: file.table });
        }

        let mut stored = 0;
        for (key, value) in file.entries {
            if self.set(&file.table, &key, value, SetOptions::default()).is_some() {
                stored += 1;
            }
        }
        if let Some(field) = &file.key {
            stored += self.load_by_field(&file.table, field, file.items);
        }
        log::info!("registry: loaded {stored} entries into {} from {}", file.table, path.display());
        Ok(stored)
    }

    /// Load every `*.json` file in `dir`, in file name order.
    pub fn load_dir(&mut self, dir: &Path) -> PoolResult<usize> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut stored = 0;
        for path in paths {
            stored += self.load_file(&path)?;
        }
        Ok(stored)
    }
}

/// `namespace:id[:id...]` with no empty part.
fn is_qualified(name: &str) -> bool {
    let mut parts = name.split(':');
    let first_ok = parts.next().is_some_and(|p| !p.is_empty());
    let mut rest = 0;
    for part in parts {
        if part.is_empty() {
            return false;
        }
        rest += 1;
    }
    first_ok && rest >= 1
}

/// A string or number usable as a table key.
fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Structural merge of `incoming` into `existing`.
fn merge(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                match dst.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        dst.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(dst), Value::Array(src)) => {
            for item in src {
                if is_scalar(&item) && dst.contains(&item) {
                    continue;
                }
                dst.push(item);
            }
        }
        (slot, value) => *slot = value,
    }
}
