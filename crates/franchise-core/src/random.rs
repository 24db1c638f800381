//! Random draws used by the season rules.
//!
//! Every draw takes the league's RNG explicitly so a seeded league replays
//! identically.

use rand::Rng;
use rand::seq::IndexedRandom;
use rand_distr::{Distribution, Normal};

/// Uniform draw from `[low, high)`. Returns `low` for an empty range.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.random_range(low..high)
    } else {
        low
    }
}

/// Uniform integer from `[low, high]`.
pub fn rand_int<R: Rng + ?Sized>(rng: &mut R, low: i32, high: i32) -> i32 {
    if high > low {
        rng.random_range(low..=high)
    } else {
        low
    }
}

/// Normal draw, truncated to `mean ± cutoff`.
pub fn gauss<R: Rng + ?Sized>(rng: &mut R, mean: f64, sigma: f64, cutoff: f64) -> f64 {
    let Ok(normal) = Normal::new(mean, sigma) else {
        return mean;
    };
    normal
        .sample(rng)
        .clamp(mean - cutoff.abs(), mean + cutoff.abs())
}

/// Uniformly chosen element, `None` for an empty slice.
pub fn choice<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// `true` with probability `p`.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.random_bool(p.clamp(0.0, 1.0))
}
