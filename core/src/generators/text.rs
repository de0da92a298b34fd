//! Digit and character strings.

use super::numeric::random_int;
use crate::rng::{Seed, SeedChain};

pub const NUMBER_ID_DEFAULT_LENGTH: f64 = 10.0;
pub const CHARACTER_DEFAULT_LENGTH: f64 = 10.0;
pub const CHARACTER_DEFAULT_MAX: f64 = 15.0;
pub const CHARACTER_DEFAULT_MIN: f64 = 0.0;

/// Highest symbol value: `z` in base 36.
const MAX_SYMBOL: f64 = 35.0;

/// Upper bound on generated string length.
pub const MAX_LENGTH: usize = 1 << 16;

/// Number of positions for a requested length: a fractional length rounds
/// up, anything non-positive or non-finite is empty.
fn positions(length: f64) -> usize {
    if length.is_finite() && length > 0.0 {
        (length.ceil() as usize).min(MAX_LENGTH)
    } else {
        0
    }
}

/// `length` decimal digits, each an independent `random_int(9, 0)`.
pub fn random_number_id(length: f64, seed: Seed) -> String {
    let mut chain = SeedChain::new(seed);
    let mut id = String::with_capacity(positions(length));
    for _ in 0..positions(length) {
        let digit = random_int(9.0, 0.0, chain.seed()) as u32;
        id.extend(char::from_digit(digit, 10));
        chain.advance();
    }
    id
}

/// `length` symbols drawn from `[min, max]` and written as base-36 digits.
///
/// `max` is capped at 35 and `min` floored at 0; an inverted pair raises
/// `max` to `min`. Since every value is at most `max`, its base-36 digit
/// is the same symbol it would have in base `max + 1`.
pub fn random_character(length: f64, max: f64, min: f64, seed: Seed) -> String {
    let min = min.clamp(0.0, MAX_SYMBOL);
    let mut max = max.min(MAX_SYMBOL);
    if max < min {
        max = min;
    }
    let mut chain = SeedChain::new(seed);
    let mut text = String::with_capacity(positions(length));
    for _ in 0..positions(length) {
        let value = random_int(max, min, chain.seed()) as u32;
        text.extend(char::from_digit(value, 36));
        chain.advance();
    }
    text
}
