//! Primitive generator contracts.

mod common;

use serde_json::json;
use xuansu_core::generators::{
    choice::{weighted_random, WeightedEntry},
    numeric::random_int,
    text::{random_character, random_number_id},
};

/// Lowercase hex digit or hyphen.
fn is_token_char(c: char) -> bool {
    c == '-' || (c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

#[test]
fn degenerate_int_range_is_exact() {
    for seed in (0..u32::MAX).step_by(97_000_001) {
        assert_eq!(random_int(10.0, 10.0, seed), 10.0);
    }
}

#[test]
fn zero_weight_selection_is_undefined() {
    let entries = [WeightedEntry::new("a", 0.0)];
    for seed in 0..50 {
        assert!(weighted_random(&entries, seed).is_none());
    }

    let engine = common::test_engine();
    let spec = json!({"type": "weighted_choose", "data": {"value": [{"value": "a", "weight": 0}]}});
    assert_eq!(engine.evaluate(&spec, Some(5)), "");
}

#[test]
fn character_alphabet_is_lowercase_base36() {
    for seed in 0..1000 {
        let s = random_character(5.0, 35.0, 0.0, seed);
        assert_eq!(s.len(), 5);
        assert!(s.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()), "{s}");
    }
}

#[test]
fn number_id_golden_values() {
    assert_eq!(random_number_id(10.0, 0), "2286363655");
    assert_eq!(random_number_id(10.0, 42), "2052304189");
}

#[test]
fn uuid_shape() {
    let engine = common::test_engine();
    for seed in 0..500 {
        let uuid = engine.random_uuid(4, Some(seed));
        assert_eq!(uuid.len(), 36, "{uuid}");
        let groups: Vec<&str> = uuid.split('-').collect();
        let lengths: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        assert_eq!(lengths, [8, 4, 4, 4, 12], "{uuid}");
        assert!(groups[2].starts_with('4'), "{uuid}");
        assert!(uuid.chars().all(is_token_char), "{uuid}");
    }
}

#[test]
fn uuid_version_digit_comes_from_data() {
    let engine = common::test_engine();
    let uuid = engine.evaluate(&json!({"type": "uuid", "data": {"version": 7}}), Some(3));
    assert_eq!(&uuid[14..15], "7");
    let uuid = engine.evaluate(&json!({"type": "uuid", "data": {"version": 12}}), Some(3));
    assert_eq!(&uuid[14..15], "2");
}

#[test]
fn qq_numbers_stay_between_biased_floor_and_max() {
    let engine = common::test_engine();
    for seed in 0..2000 {
        let qq = engine.random_qq_number(4e9, Some(seed)).unwrap();
        assert_eq!(qq.fract(), 0.0);
        // Lower bound is 1e9 - |v * 1e6| with |v| <= 999.
        assert!(qq >= 1e6 && qq <= 4e9, "{qq}");
    }
}

#[test]
fn qq_number_golden_values() {
    let engine = common::test_engine();
    let spec = json!({"type": "qq_number"});
    assert_eq!(engine.evaluate(&spec, Some(42)), "835793907");
    assert_eq!(engine.evaluate(&spec, Some(7)), "3698783548");
}

#[test]
fn normal_int_clusters_around_mean() {
    let engine = common::test_engine();
    let spec = json!({"type": "normal_int", "data": {"mean": 500, "range": 60}});
    let mut total = 0.0;
    for seed in 0..2000 {
        let v: f64 = engine.evaluate(&spec, Some(seed)).parse().unwrap();
        assert!((440.0..=560.0).contains(&v), "{v}");
        total += v;
    }
    let mean = total / 2000.0;
    assert!((mean - 500.0).abs() < 5.0, "sample mean {mean}");
}
