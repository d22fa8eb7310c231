//! Entropy-backed random source.

use battle_core::RandomSource;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// [`RandomSource`] over the `rand` standard generator.
///
/// Use [`SystemRng::from_entropy`] for play and [`SystemRng::seeded`] to
/// replay a run.
#[derive(Clone, Debug)]
pub struct SystemRng {
    inner: StdRng,
}

impl SystemRng {
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SystemRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }
}
