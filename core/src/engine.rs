//! The pool engine: the one entry point launchers and tests call.
//!
//! `evaluate(spec, seed)` compiles the spec, evaluates every top-level
//! sibling and concatenates what they render.
//!
//! RULES:
//!   - With a seed, the output is a pure function of (spec, seed, registry
//!     contents, fragments).
//!   - Without a seed, one seed is drawn from entropy per call and used
//!     exactly as if the caller had passed it. The chain is a local of the
//!     call, so nothing is pinned on the engine between calls and
//!     separate engines never share state.
//!   - `evaluate` never fails: a sibling that errors contributes nothing.
//!     `try_evaluate` reports the first error instead.

use crate::{
    config::EngineConfig,
    error::PoolResult,
    evaluator::Evaluator,
    fragment::{FragmentLibrary, FragmentSource},
    generators::composite::{
        ipv4_template, qq_number_template, uuid_template, Ipv4Options, Template,
    },
    pool::{NodeId, PoolArena},
    registry::Registry,
    rng::{Seed, SeedChain},
    value::Value,
};
use std::path::Path;

pub struct PoolEngine {
    config: EngineConfig,
    registry: Registry,
    fragments: Box<dyn FragmentSource>,
}

impl PoolEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: Registry::with_namespace(&config.default_namespace),
            fragments: Box::new(FragmentLibrary::new()),
            config,
        }
    }

    /// Engine with test limits and empty registry and fragment library.
    pub fn build_test() -> Self {
        Self::new(EngineConfig::default_test())
    }

    /// Build from a data directory: engine.json, registry/ and fragments/.
    /// Missing pieces fall back to defaults or stay empty.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let config = EngineConfig::load(data_dir)?;
        let mut engine = Self::new(config);

        let registry_dir = Path::new(data_dir).join("registry");
        if registry_dir.is_dir() {
            let stored = engine.registry.load_dir(&registry_dir)?;
            log::info!("engine: {stored} registry entries from {}", registry_dir.display());
        }

        let fragment_dir = Path::new(data_dir).join("fragments");
        if fragment_dir.is_dir() {
            let mut library = FragmentLibrary::new();
            library.load_dir(&fragment_dir)?;
            engine.fragments = Box::new(library);
        }
        Ok(engine)
    }

    /// Replace the fragment loader hook.
    pub fn with_fragments(mut self, source: impl FragmentSource + 'static) -> Self {
        self.fragments = Box::new(source);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    fn evaluator<'a>(&'a self, arena: &'a mut PoolArena) -> Evaluator<'a> {
        Evaluator::new(arena, &self.config)
            .with_registry(&self.registry)
            .with_fragments(&*self.fragments)
    }

    fn chain(seed: Option<Seed>) -> SeedChain {
        seed.map(SeedChain::new).unwrap_or_else(SeedChain::from_entropy)
    }

    pub fn evaluate(&self, spec: &serde_json::Value, seed: Option<Seed>) -> String {
        let (mut arena, roots) = PoolArena::from_json(spec);
        self.evaluate_arena(&mut arena, &roots, seed)
    }

    pub fn try_evaluate(&self, spec: &serde_json::Value, seed: Option<Seed>) -> PoolResult<String> {
        let (mut arena, roots) = PoolArena::from_json(spec);
        self.try_evaluate_arena(&mut arena, &roots, seed)
    }

    /// Evaluate a prebuilt arena. Imports resolved here stay resolved in
    /// `arena` for later calls.
    pub fn evaluate_arena(
        &self,
        arena: &mut PoolArena,
        roots: &[NodeId],
        seed: Option<Seed>,
    ) -> String {
        let mut chain = Self::chain(seed);
        let mut evaluator = self.evaluator(arena);
        let mut output = String::new();
        for &root in roots {
            match evaluator.evaluate_node(root, chain.seed()) {
                Ok(value) => {
                    if let Some(text) = value.as_ref().and_then(Value::render) {
                        output.push_str(&text);
                    }
                }
                Err(e) => log::warn!("pool node {}: {e}; contributes nothing", root.index()),
            }
            chain.advance();
        }
        output
    }

    pub fn try_evaluate_arena(
        &self,
        arena: &mut PoolArena,
        roots: &[NodeId],
        seed: Option<Seed>,
    ) -> PoolResult<String> {
        let chain = Self::chain(seed);
        self.evaluator(arena).evaluate_sequence(roots, chain.seed())
    }

    fn run_template(&self, template: Template, seed: Option<Seed>) -> Option<Value> {
        let Template { mut arena, root } = template;
        let chain = Self::chain(seed);
        match self.evaluator(&mut arena).evaluate_node(root, chain.seed()) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("template: {e}");
                None
            }
        }
    }

    /// `xxxxxxxx-xxxx-Vxxx-xxxx-xxxxxxxxxxxx`, lowercase hex.
    pub fn random_uuid(&self, version: u32, seed: Option<Seed>) -> String {
        self.run_template(uuid_template(version as f64), seed)
            .and_then(|v| v.render())
            .unwrap_or_default()
    }

    pub fn random_qq_number(&self, max: f64, seed: Option<Seed>) -> Option<f64> {
        self.run_template(qq_number_template(max), seed)?.as_f64()
    }

    /// `None` when every class is disabled.
    pub fn random_ipv4(&self, options: Ipv4Options, seed: Option<Seed>) -> Option<String> {
        self.run_template(ipv4_template(options)?, seed)?.render()
    }
}

impl Default for PoolEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
