//! Injectable random source for combat rolls.
//!
//! Every random decision in a battle (turn-order tie-breaks, AI picks, evasion,
//! critical hits, status chances, encounter rolls) draws from one
//! [`RandomSource`] owned by the battle. Seeded sources make a battle fully
//! reproducible.

use std::collections::VecDeque;

/// Stateful random number source.
pub trait RandomSource {
    /// Generate the next random u32 value.
    fn next_u32(&mut self) -> u32;

    /// Uniform float in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Uniform index in `[0, n)`. Returns 0 when `n` is 0.
    fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.next_f64() * n as f64) as usize).min(n - 1)
    }

    /// Uniform integer in `[min, max]` inclusive.
    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        min + self.below((max - min) as usize + 1) as u32
    }

    /// Returns true with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// Uses the PCG-XSH-RR variant, which produces 32-bit output from 64-bit
/// state. Same seed, same sequence.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Debug)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.step();
        rng.state = rng.state.wrapping_add(seed);
        rng.step();
        rng
    }

    /// `state' = state * multiplier + increment (mod 2^64)`
    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    /// XSH-RR output permutation.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RandomSource for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.step();
        Self::output(old)
    }
}

/// Replays a fixed script of floats, then repeats a fallback value.
///
/// Useful for forcing particular outcomes (a miss, a crit, a tie-break) in
/// tests and replays.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    script: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRng {
    pub fn new(script: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: 0.5,
        }
    }

    /// Source that always yields `value`.
    pub fn constant(value: f64) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: value,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }
}

impl RandomSource for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_f64() * f64::from(u32::MAX)) as u32
    }

    fn next_f64(&mut self) -> f64 {
        self.script
            .pop_front()
            .unwrap_or(self.fallback)
            .clamp(0.0, 0.999_999_999)
    }
}
