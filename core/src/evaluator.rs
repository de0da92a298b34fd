//! The pool evaluator.
//!
//! Each node goes through, in order:
//!   1. kind check      unregistered kinds yield nothing
//!   2. imports         registry values written into `data`, once
//!   3. binding         parameters read from `data`; nested pools are
//!                      evaluated with the node's seed, which then advances
//!   4. invoke          the primitive runs with the (possibly advanced) seed
//!   5. modify          the node's modifier, if any
//! The caller decides what to emit: sequences append numbers and strings
//! and skip everything else.
//!
//! RULES:
//!   - Seeds are values. Nothing an inner node does moves the seed of its
//!     parent except the explicit per-parameter and per-sibling advances.
//!   - Every nested evaluation (parameter pool, selected candidate,
//!     sequence item, template, fragment) is one level deeper. Going past
//!     `max_depth` is `DepthExceeded`, the only error evaluation raises.

use crate::{
    config::EngineConfig,
    error::{PoolError, PoolResult},
    fragment::FragmentSource,
    generators::{
        choice::{choose, weighted_random, WeightedEntry},
        composite::{
            self, ipv4_template, qq_number_template, uuid_template, Ipv4Options, Template,
        },
        numeric::{self, normal_random_int, random_int},
        text::{self, random_character, random_number_id},
    },
    kind::PoolKind,
    pool::{NodeId, PoolArena},
    registry::Registry,
    rng::{next_seed, Seed, SeedChain},
    value::Value,
};

pub struct Evaluator<'a> {
    arena: &'a mut PoolArena,
    config: &'a EngineConfig,
    registry: Option<&'a Registry>,
    fragments: Option<&'a dyn FragmentSource>,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(arena: &'a mut PoolArena, config: &'a EngineConfig) -> Self {
        Self {
            arena,
            config,
            registry: None,
            fragments: None,
            depth: 0,
        }
    }

    pub fn with_registry(mut self, registry: &'a Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_fragments(mut self, fragments: &'a dyn FragmentSource) -> Self {
        self.fragments = Some(fragments);
        self
    }

    /// Evaluate `roots` in order and concatenate what they render.
    /// Sibling `i + 1` starts one seed step after sibling `i`.
    pub fn evaluate_sequence(&mut self, roots: &[NodeId], seed: Seed) -> PoolResult<String> {
        let mut chain = SeedChain::new(seed);
        let mut output = String::new();
        for &id in roots {
            let value = self.evaluate_node(id, chain.seed())?;
            if let Some(text) = value.as_ref().and_then(Value::render) {
                output.push_str(&text);
            }
            chain.advance();
        }
        Ok(output)
    }

    /// Raw value of one node, before any stringification.
    pub fn evaluate_node(&mut self, id: NodeId, seed: Seed) -> PoolResult<Option<Value>> {
        if self.depth > self.config.max_depth {
            return Err(PoolError::DepthExceeded { depth: self.depth });
        }
        let Some(node) = self.arena.get(id) else {
            log::warn!("pool node {} does not exist", id.index());
            return Ok(None);
        };
        let kind = node.kind.clone();
        if !kind.is_registered() {
            log::debug!("pool node {}: unregistered type '{kind}', skipped", id.index());
            return Ok(None);
        }

        self.resolve_imports(id);
        let raw = self.invoke(id, &kind, seed)?;
        log::debug!(
            "depth={} node={} type={kind} seed={seed} raw={raw:?}",
            self.depth,
            id.index()
        );

        let modifier = self.arena.get(id).and_then(|n| n.modifier.clone());
        Ok(match modifier {
            Some(modifier) => modifier.apply(raw),
            None => raw,
        })
    }

    /// Run a composite template one level below the current node.
    pub fn evaluate_template(
        &mut self,
        template: Template,
        seed: Seed,
    ) -> PoolResult<Option<Value>> {
        let Template { mut arena, root } = template;
        let mut nested = Evaluator {
            arena: &mut arena,
            config: self.config,
            registry: self.registry,
            fragments: self.fragments,
            depth: self.depth + 1,
        };
        nested.evaluate_node(root, seed)
    }

    fn nested(&mut self, id: NodeId, seed: Seed) -> PoolResult<Option<Value>> {
        self.depth += 1;
        let result = self.evaluate_node(id, seed);
        self.depth -= 1;
        result
    }

    /// Copy registry values into `data` and drop the directives so they
    /// never resolve twice. A miss leaves the field as it was.
    fn resolve_imports(&mut self, id: NodeId) {
        let imports = match self.arena.get_mut(id) {
            Some(node) if !node.import.is_empty() => std::mem::take(&mut node.import),
            _ => return,
        };
        let config = self.config;
        let registry = self.registry;

        for (field, directive) in imports {
            let table = directive
                .table
                .as_deref()
                .unwrap_or(&config.default_import_table);
            let Some(json) = registry.and_then(|r| r.get(table, &directive.name)) else {
                log::debug!("pool node {}: import {table}/{} missing", id.index(), directive.name);
                continue;
            };
            let value = self.arena.compile_value(&json);
            if let Some(node) = self.arena.get_mut(id) {
                node.data.insert(field, value);
            }
        }
    }

    /// Read each declared parameter, resolving nested pools in order.
    fn bind(
        &mut self,
        id: NodeId,
        kind: &PoolKind,
        chain: &mut SeedChain,
    ) -> PoolResult<Vec<Value>> {
        let mut args = Vec::with_capacity(kind.parameters().len());
        for name in kind.parameters() {
            let value = self
                .arena
                .get(id)
                .and_then(|n| n.data.get(*name))
                .cloned()
                .unwrap_or(Value::Null);
            let value = match value {
                Value::Pool(child) => {
                    let resolved = self.nested(child, chain.seed())?;
                    chain.advance();
                    resolved.unwrap_or(Value::Null)
                }
                other => other,
            };
            args.push(value);
        }
        Ok(args)
    }

    fn invoke(&mut self, id: NodeId, kind: &PoolKind, seed: Seed) -> PoolResult<Option<Value>> {
        if *kind == PoolKind::None {
            let value = self.arena.get(id).and_then(|n| n.data.get("value")).cloned();
            return Ok(value.filter(|v| !v.is_null()));
        }

        let mut chain = SeedChain::new(seed);
        let args = self.bind(id, kind, &mut chain)?;
        let seed = chain.seed();

        let result = match kind {
            PoolKind::Int => Some(Value::Number(random_int(
                number(&args, 0, numeric::INT_DEFAULT_MAX),
                number(&args, 1, numeric::INT_DEFAULT_MIN),
                seed,
            ))),
            PoolKind::NormalInt => Some(Value::Number(normal_random_int(
                number(&args, 0, numeric::NORMAL_DEFAULT_MEAN),
                number(&args, 1, numeric::NORMAL_DEFAULT_RANGE),
                seed,
                self.config.normal_max_iterations,
            ))),
            PoolKind::NumberId => Some(Value::Text(random_number_id(
                number(&args, 0, text::NUMBER_ID_DEFAULT_LENGTH),
                seed,
            ))),
            PoolKind::Character => Some(Value::Text(random_character(
                number(&args, 0, text::CHARACTER_DEFAULT_LENGTH),
                number(&args, 1, text::CHARACTER_DEFAULT_MAX),
                number(&args, 2, text::CHARACTER_DEFAULT_MIN),
                seed,
            ))),
            PoolKind::Choose => match choose(list(&args, 0), seed).cloned() {
                Some(picked) => self.select(picked, seed)?,
                None => None,
            },
            PoolKind::WeightedChoose => {
                let entries: Vec<WeightedEntry> =
                    list(&args, 0).iter().map(WeightedEntry::from_value).collect();
                match weighted_random(&entries, seed).cloned() {
                    Some(picked) => self.select(picked, seed)?,
                    None => None,
                }
            }
            PoolKind::Uuid => {
                let version = number(&args, 0, composite::UUID_DEFAULT_VERSION);
                self.evaluate_template(uuid_template(version), seed)?
            }
            PoolKind::QqNumber => {
                let max = number(&args, 0, composite::QQ_DEFAULT_MAX);
                self.evaluate_template(qq_number_template(max), seed)?
            }
            PoolKind::Ipv4 => {
                let options = Ipv4Options {
                    has_class_a: flag(&args, 0, true),
                    has_class_b: flag(&args, 1, true),
                    has_class_c: flag(&args, 2, true),
                };
                match ipv4_template(options) {
                    Some(template) => self.evaluate_template(template, seed)?,
                    None => None,
                }
            }
            PoolKind::Concat => Some(Value::Text(self.concat(list(&args, 0), seed)?)),
            PoolKind::Fragment => match args.first().and_then(Value::as_str) {
                Some(name) => self.fragment(name, seed)?,
                None => None,
            },
            PoolKind::None | PoolKind::Unregistered(_) => None,
        };
        Ok(result)
    }

    /// A chosen candidate: pools are evaluated one step past the draw.
    fn select(&mut self, picked: Value, draw_seed: Seed) -> PoolResult<Option<Value>> {
        match picked {
            Value::Pool(child) => self.nested(child, next_seed(draw_seed)),
            Value::Null => Ok(None),
            other => Ok(Some(other)),
        }
    }

    fn concat(&mut self, items: &[Value], seed: Seed) -> PoolResult<String> {
        let mut chain = SeedChain::new(seed);
        let mut output = String::new();
        for item in items {
            let value = match item {
                Value::Pool(child) => self.nested(*child, chain.seed())?,
                other => Some(other.clone()),
            };
            if let Some(text) = value.as_ref().and_then(Value::render) {
                output.push_str(&text);
            }
            chain.advance();
        }
        Ok(output)
    }

    /// A single-node fragment keeps its raw value; a sequence concatenates.
    fn fragment(&mut self, name: &str, seed: Seed) -> PoolResult<Option<Value>> {
        let Some(source) = self.fragments else {
            log::warn!("fragment '{name}' requested but no fragment source is attached");
            return Ok(None);
        };
        let Some(spec) = source.resolve_fragment(name) else {
            log::warn!("fragment '{name}' not found");
            return Ok(None);
        };

        let (mut arena, roots) = PoolArena::from_json(&spec);
        let mut nested = Evaluator {
            arena: &mut arena,
            config: self.config,
            registry: self.registry,
            fragments: self.fragments,
            depth: self.depth + 1,
        };
        match roots.as_slice() {
            [root] => nested.evaluate_node(*root, seed),
            _ => Ok(Some(Value::Text(nested.evaluate_sequence(&roots, seed)?))),
        }
    }
}

fn number(args: &[Value], index: usize, default: f64) -> f64 {
    args.get(index).and_then(Value::as_f64).unwrap_or(default)
}

/// Booleans as-is, numbers by non-zero, anything else the default.
fn flag(args: &[Value], index: usize, default: bool) -> bool {
    match args.get(index) {
        Some(Value::Bool(b)) => *b,
        Some(value) => value.as_f64().map(|n| n != 0.0).unwrap_or(default),
        None => default,
    }
}

fn list(args: &[Value], index: usize) -> &[Value] {
    args.get(index).and_then(Value::as_list).unwrap_or(&[])
}
