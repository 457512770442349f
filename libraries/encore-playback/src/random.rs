//! Injectable randomness
//!
//! Shuffle order, the interstitial coin flip and ad selection all draw from a
//! [`RandomSource`] owned by the engine, so tests can script every draw.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random draws
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `[0, upper)`
    ///
    /// Callers guarantee `upper > 0`.
    fn index_below(&mut self, upper: usize) -> usize;
}

/// `RandomSource` backed by `rand`'s standard generator
#[derive(Debug, Clone)]
pub struct StdRandom(StdRng);

impl StdRandom {
    /// Seed from the operating system (or `crypto.getRandomValues` on wasm)
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Deterministic generator for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn index_below(&mut self, upper: usize) -> usize {
        self.0.gen_range(0..upper)
    }
}
