//! Weighted and uniform selection.
//!
//! Selection is a left-to-right cumulative scan: draw `u * total`, subtract
//! each weight in order, pick the entry that drives the remainder negative.
//! The scan order is part of the output contract; never sort or shuffle
//! the candidates.

use crate::{
    rng::{self, Seed},
    value::Value,
};

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedEntry {
    pub value: Value,
    pub weight: f64,
}

impl WeightedEntry {
    pub fn new(value: impl Into<Value>, weight: f64) -> Self {
        Self {
            value: value.into(),
            weight,
        }
    }

    /// Read a `{value, weight}` map. A missing or non-numeric weight
    /// counts as zero; a non-map entry is a zero-weight null.
    pub fn from_value(entry: &Value) -> Self {
        match entry.as_map() {
            Some(map) => Self {
                value: map.get("value").cloned().unwrap_or(Value::Null),
                weight: map.get("weight").and_then(Value::as_f64).unwrap_or(0.0),
            },
            None => Self::new(Value::Null, 0.0),
        }
    }
}

/// Index of the selected weight, or `None` when the total is not positive
/// or rounding lets the scan run off the end.
pub fn weighted_index(weights: &[f64], seed: Seed) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return None;
    }
    let (uniform, _) = rng::next(seed);
    let mut remaining = uniform * total;
    for (i, weight) in weights.iter().enumerate() {
        remaining -= weight;
        if remaining < 0.0 {
            return Some(i);
        }
    }
    None
}

pub fn weighted_random(entries: &[WeightedEntry], seed: Seed) -> Option<&Value> {
    let weights: Vec<f64> = entries.iter().map(|e| e.weight).collect();
    weighted_index(&weights, seed).map(|i| &entries[i].value)
}

/// Uniform choice: every candidate weighs 1, input order preserved.
pub fn choose(items: &[Value], seed: Seed) -> Option<&Value> {
    let weights = vec![1.0; items.len()];
    weighted_index(&weights, seed).map(|i| &items[i])
}
