//! Composite primitives expressed as pool templates.
//!
//! Each builder returns a small self-contained arena. The evaluator runs
//! the template one nesting level below the node that asked for it, with
//! that node's seed, so composites obey the same seed-threading rules as
//! hand-written specs.

use crate::{
    kind::PoolKind,
    modifier::Modifier,
    pool::{NodeId, PoolArena, PoolNode},
    value::Value,
};
use std::collections::BTreeMap;

pub const UUID_DEFAULT_VERSION: f64 = 4.0;
pub const QQ_DEFAULT_MAX: f64 = 4e9;

/// Representable addresses per class; these are the selection weights.
pub const CLASS_A_WEIGHT: f64 = 2_147_483_520.0;
pub const CLASS_B_WEIGHT: f64 = 1_073_709_056.0;
pub const CLASS_C_WEIGHT: f64 = 532_676_608.0;

/// First-octet ranges, inclusive.
pub const CLASS_A_FIRST_OCTET: (u32, u32) = (1, 126);
pub const CLASS_B_FIRST_OCTET: (u32, u32) = (128, 191);
pub const CLASS_C_FIRST_OCTET: (u32, u32) = (192, 223);

pub struct Template {
    pub arena: PoolArena,
    pub root: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Options {
    pub has_class_a: bool,
    pub has_class_b: bool,
    pub has_class_c: bool,
}

impl Default for Ipv4Options {
    fn default() -> Self {
        Self {
            has_class_a: true,
            has_class_b: true,
            has_class_c: true,
        }
    }
}

fn character(arena: &mut PoolArena, length: u32) -> Value {
    Value::Pool(arena.push(PoolNode::new(PoolKind::Character).with("length", length)))
}

/// UUID-shaped token `xxxxxxxx-xxxx-Vxxx-xxxx-xxxxxxxxxxxx` of lowercase
/// hex, where `V` is `version mod 10`. Not an RFC 4122 UUID.
///
/// The version digit travels with its hyphen as one literal, so the token
/// is nine siblings long; the sibling count fixes every segment's seed.
pub fn uuid_template(version: f64) -> Template {
    let digit = (version.abs().trunc() % 10.0) as u32;
    let mut arena = PoolArena::new();
    let items = vec![
        character(&mut arena, 8),
        Value::from("-"),
        character(&mut arena, 4),
        Value::Text(format!("-{digit}")),
        character(&mut arena, 3),
        Value::from("-"),
        character(&mut arena, 4),
        Value::from("-"),
        character(&mut arena, 12),
    ];
    let root = arena.push(PoolNode::new(PoolKind::Concat).with("value", items));
    Template { arena, root }
}

/// QQ-style account number: `int(max, min)` whose lower bound is a normal
/// deviate around 0 (range 999) pushed through `1e9 - |v * 1e6|`.
pub fn qq_number_template(max: f64) -> Template {
    let mut arena = PoolArena::new();
    let lower = arena.push(
        PoolNode::new(PoolKind::NormalInt)
            .with("mean", 0)
            .with("range", 999)
            .with_modifier(Modifier::QqLowerBound),
    );
    let root = arena.push(
        PoolNode::new(PoolKind::Int)
            .with("max", max)
            .with("min", lower),
    );
    Template { arena, root }
}

fn octet(arena: &mut PoolArena, (min, max): (u32, u32)) -> Value {
    Value::Pool(arena.push(PoolNode::new(PoolKind::Int).with("max", max).with("min", min)))
}

fn address_class(arena: &mut PoolArena, first: (u32, u32), modifier: Modifier) -> Value {
    let items = vec![
        octet(arena, first),
        Value::from("."),
        octet(arena, (0, 255)),
        Value::from("."),
        octet(arena, (0, 255)),
        Value::from("."),
        octet(arena, (0, 255)),
    ];
    Value::Pool(arena.push(
        PoolNode::new(PoolKind::Concat)
            .with("value", items)
            .with_modifier(modifier),
    ))
}

fn weighted(value: Value, weight: f64) -> Value {
    let mut entry = BTreeMap::new();
    entry.insert("value".to_string(), value);
    entry.insert("weight".to_string(), Value::Number(weight));
    Value::Map(entry)
}

/// Dotted IPv4 address drawn from the enabled classes, weighted by class
/// size. `None` when every class is disabled.
pub fn ipv4_template(options: Ipv4Options) -> Option<Template> {
    let mut arena = PoolArena::new();
    let mut entries = Vec::new();
    if options.has_class_a {
        let class = address_class(&mut arena, CLASS_A_FIRST_OCTET, Modifier::Ipv4ClassA);
        entries.push(weighted(class, CLASS_A_WEIGHT));
    }
    if options.has_class_b {
        let class = address_class(&mut arena, CLASS_B_FIRST_OCTET, Modifier::Ipv4ClassB);
        entries.push(weighted(class, CLASS_B_WEIGHT));
    }
    if options.has_class_c {
        let class = address_class(&mut arena, CLASS_C_FIRST_OCTET, Modifier::Ipv4ClassC);
        entries.push(weighted(class, CLASS_C_WEIGHT));
    }
    if entries.is_empty() {
        return None;
    }
    let root = arena.push(PoolNode::new(PoolKind::WeightedChoose).with("value", entries));
    Some(Template { arena, root })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_template_has_nine_siblings() {
        let t = uuid_template(4.0);
        let root = t.arena.get(t.root).unwrap();
        assert_eq!(root.kind, PoolKind::Concat);
        let items = root.data["value"].as_list().unwrap();
        assert_eq!(items.len(), 9);
        assert_eq!(items[3], Value::from("-4"));
    }

    #[test]
    fn uuid_version_digit_wraps() {
        let t = uuid_template(14.0);
        let items = t.arena.get(t.root).unwrap().data["value"].as_list().unwrap().to_vec();
        assert_eq!(items[3], Value::from("-4"));
    }

    #[test]
    fn ipv4_without_classes_is_none() {
        let none = Ipv4Options {
            has_class_a: false,
            has_class_b: false,
            has_class_c: false,
        };
        assert!(ipv4_template(none).is_none());
        assert!(ipv4_template(Ipv4Options::default()).is_some());
    }
}
