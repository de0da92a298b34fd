//! Shared setup for the integration tests.

#![allow(dead_code)]

use xuansu_core::{PoolEngine, Registry};

/// Route `log` output through env_logger so `RUST_LOG=debug cargo test`
/// shows the per-node evaluation trace. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_engine() -> PoolEngine {
    init_logging();
    PoolEngine::build_test()
}

pub fn test_registry() -> Registry {
    init_logging();
    Registry::new()
}
