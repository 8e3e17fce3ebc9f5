/// Random sources for encounter draws and escalation.
///
/// The engine never touches a global RNG; every draw goes through a
/// `RandomSource` so tests can pin the outcome.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub trait RandomSource {
    /// Pick an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl RandomSource for StdRng {
    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Seeded production source.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Source seeded from operating-system entropy.
pub fn from_entropy() -> StdRng {
    StdRng::from_entropy()
}

/// A fixed sequence of indices, for deterministic tests and replays.
///
/// Each value is reduced modulo the requested length. After the script
/// runs out the last value repeats (0 if the script was empty).
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: VecDeque<usize>,
    last: usize,
}

impl ScriptedSource {
    pub fn new(script: &[usize]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            last: 0,
        }
    }

    /// Always pick the same index.
    pub fn constant(index: usize) -> Self {
        Self {
            script: VecDeque::new(),
            last: index,
        }
    }
}

impl RandomSource for ScriptedSource {
    fn pick(&mut self, len: usize) -> usize {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last % len
    }
}
