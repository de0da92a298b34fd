//! Uniform and normal-approximated integers.

use crate::rng::{self, Seed, SeedChain};
use std::f64::consts::PI;

pub const INT_DEFAULT_MAX: f64 = 1.0;
pub const INT_DEFAULT_MIN: f64 = 0.0;
pub const NORMAL_DEFAULT_MEAN: f64 = 0.0;
pub const NORMAL_DEFAULT_RANGE: f64 = 10.0;

/// Uniform integer in `[ceil(min), floor(max)]`.
///
/// An inverted range (after rounding) is clamped so that `max == min`.
pub fn random_int(max: f64, min: f64, seed: Seed) -> f64 {
    let min = min.ceil();
    let mut max = max.floor();
    if max < min {
        max = min;
    }
    let (uniform, _) = rng::next(seed);
    (uniform * (max - min + 1.0)).floor() + min
}

/// Integer around `mean`, Box–Muller with standard deviation `range / 3`,
/// rejection-sampled into `[-range, range]`.
///
/// Each attempt consumes two draws. After `max_iterations` rejected
/// attempts the result falls back to `floor(mean + 0.5)`.
pub fn normal_random_int(mean: f64, range: f64, seed: Seed, max_iterations: u32) -> f64 {
    let mut chain = SeedChain::new(seed);
    for _ in 0..max_iterations {
        let u1 = chain.draw();
        let u2 = chain.draw();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * (range / 3.0);
        if z.is_finite() && z >= -range && z <= range {
            return (mean + z + 0.5).floor();
        }
    }
    log::warn!(
        "normal_int: no deviate within ±{range} after {max_iterations} attempts, using mean {mean}"
    );
    (mean + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_draw_of_seed_zero() {
        // uniform(0) = 0.23606797..., so floor(0.236 * 10) = 2.
        assert_eq!(random_int(9.0, 0.0, 0), 2.0);
    }

    #[test]
    fn degenerate_range_is_exact() {
        for seed in [0, 1, 42, 0xDEAD_BEEF, u32::MAX] {
            assert_eq!(random_int(10.0, 10.0, seed), 10.0);
        }
    }

    #[test]
    fn inverted_range_clamps_to_min() {
        assert_eq!(random_int(3.0, 8.0, 77), 8.0);
    }

    #[test]
    fn bounds_are_rounded_inward() {
        for seed in 0..500 {
            let v = random_int(5.9, 2.1, seed);
            assert!((3.0..=5.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn normal_stays_within_range_of_mean() {
        for seed in 0..500 {
            let v = normal_random_int(100.0, 10.0, seed, 1000);
            assert!((90.0..=110.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn negative_range_falls_back_to_mean() {
        assert_eq!(normal_random_int(7.0, -5.0, 3, 50), 7.0);
    }

    #[test]
    fn zero_range_is_the_mean() {
        assert_eq!(normal_random_int(12.0, 0.0, 9, 1000), 12.0);
    }
}
