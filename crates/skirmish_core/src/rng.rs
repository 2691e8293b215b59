//! Seeded random source owned by the simulation.
//!
//! Every probabilistic behaviour draws from one [`SimRng`] so that an
//! identical seed and identical inputs reproduce an identical match.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Random generator type used throughout the simulation.
pub type SimRng = Pcg32;

/// Create a generator from a seed.
#[must_use]
pub fn seeded(seed: u64) -> SimRng {
    Pcg32::seed_from_u64(seed)
}

/// Uniform float in `[lo, hi)`, or `lo` when the range is empty.
pub fn uniform(rng: &mut SimRng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

/// Uniform float in `[-magnitude, magnitude)`.
pub fn symmetric(rng: &mut SimRng, magnitude: f32) -> f32 {
    uniform(rng, -magnitude, magnitude)
}

/// Bernoulli trial; probabilities outside `[0, 1]` are clamped.
pub fn chance(rng: &mut SimRng, probability: f64) -> bool {
    let p = if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    };
    rng.random_bool(p)
}

/// Random sign, `1.0` or `-1.0`.
pub fn sign(rng: &mut SimRng) -> f32 {
    if rng.random_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}
