//! Engine configuration.
//!
//! Data directory layout:
//!   <data_dir>/engine.json          optional, EngineConfig fields
//!   <data_dir>/registry/*.json      registry seed tables
//!   <data_dir>/fragments/*.json     named pool fragments
//! Only `engine.json` is read here; the other two are loaded by
//! `PoolEngine::load`.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest allowed pool nesting before evaluation reports
    /// `DepthExceeded`.
    pub max_depth: usize,
    /// Rejected Box–Muller attempts before `normal_int` falls back to
    /// its mean.
    pub normal_max_iterations: u32,
    /// Prefix for bare registry table names.
    pub default_namespace: String,
    /// Table used by import directives that do not name one.
    pub default_import_table: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            normal_max_iterations: 1000,
            default_namespace: "xuansu".to_string(),
            default_import_table: "data".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from the data/ directory. A missing engine.json means defaults.
    /// In tests, use EngineConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/engine.json");
        if !Path::new(&path).exists() {
            log::info!("no {path}, using default engine config");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Small limits so depth and rejection-loop tests stay fast.
    pub fn default_test() -> Self {
        Self {
            max_depth: 16,
            normal_max_iterations: 200,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"max_depth": 3}"#).unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.normal_max_iterations, 1000);
        assert_eq!(config.default_namespace, "xuansu");
        assert_eq!(config.default_import_table, "data");
    }

    #[test]
    fn missing_data_dir_gives_defaults() {
        let config = EngineConfig::load("/nonexistent/xuansu-data").unwrap();
        assert_eq!(config.max_depth, 64);
    }
}
