//! xuansu-core: seeded, declarative synthetic value generation.
//!
//! A pool spec is a tree of typed nodes (`int`, `character`, `choose`,
//! `uuid`, `ipv4`, ...). The engine walks it with a 32-bit LCG seed chain,
//! so the same spec and seed always produce the same string.
//!
//! ```text
//! JSON spec ──► PoolArena ──► Evaluator ──► String
//!                               │   ▲
//!                    generators ┘   └ Registry (imports), FragmentSource
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod fragment;
pub mod generators;
pub mod kind;
pub mod modifier;
pub mod pool;
pub mod registry;
pub mod rng;
pub mod value;

pub use config::EngineConfig;
pub use engine::PoolEngine;
pub use error::{PoolError, PoolResult};
pub use kind::PoolKind;
pub use modifier::Modifier;
pub use pool::{NodeId, PoolArena, PoolNode};
pub use registry::{Registry, SetOptions};
pub use value::Value;
