//! Named pool fragments: the loader hook.
//!
//! A `fragment` pool asks the engine's `FragmentSource` for a spec by name
//! and evaluates it in place. Where the spec comes from (files, a network
//! fetch, a script loader) is the source's business.

use crate::error::PoolResult;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub trait FragmentSource: Send + Sync {
    /// The pool spec registered under `name`, if any.
    fn resolve_fragment(&self, name: &str) -> Option<Value>;
}

/// In-memory fragment table, optionally filled from a directory.
#[derive(Debug, Clone, Default)]
pub struct FragmentLibrary {
    fragments: BTreeMap<String, Value>,
}

impl FragmentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, spec: Value) {
        self.fragments.insert(name.to_string(), spec);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Load every `*.json` file in `dir`; the file stem is the name.
    pub fn load_dir(&mut self, dir: &Path) -> PoolResult<usize> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = std::fs::read_to_string(&path)?;
            let spec: Value = serde_json::from_str(&content)?;
            self.insert(name, spec);
            loaded += 1;
        }
        log::info!("fragments: loaded {loaded} from {}", dir.display());
        Ok(loaded)
    }
}

impl FragmentSource for FragmentLibrary {
    fn resolve_fragment(&self, name: &str) -> Option<Value> {
        self.fragments.get(name).cloned()
    }
}
