use std::collections::VecDeque;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Supplies indices for random template selection.
///
/// Callers always pass `bound > 0` and expect a value in `[0, bound)`. Implementations are
/// asked again for every draw; nothing is cached between calls.
pub trait IndexSource {
    /// Draw one index in `[0, bound)`.
    fn next_index(&mut self, bound: usize) -> usize;
}

impl<T: IndexSource + ?Sized> IndexSource for Box<T> {
    fn next_index(&mut self, bound: usize) -> usize {
        (**self).next_index(bound)
    }
}

/// Uniform draws from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngIndexSource;

impl IndexSource for ThreadRngIndexSource {
    fn next_index(&mut self, bound: usize) -> usize {
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Uniform draws from a seeded RNG, reproducible across runs.
#[derive(Clone, Debug)]
pub struct SeededIndexSource {
    rng: StdRng,
}

impl SeededIndexSource {
    /// Create a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IndexSource for SeededIndexSource {
    fn next_index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

/// Replays a fixed sequence of indices.
///
/// Once the sequence is exhausted the last value repeats forever. An empty script always
/// yields `0`. Values are returned as-is, even when they are out of range for the bound.
#[derive(Clone, Debug, Default)]
pub struct ScriptedIndexSource {
    queue: VecDeque<usize>,
    last: usize,
}

impl ScriptedIndexSource {
    /// Replay `indices` in order.
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            queue: indices.into_iter().collect(),
            last: 0,
        }
    }

    /// Always return `index`.
    pub fn fixed(index: usize) -> Self {
        Self::new([index])
    }
}

impl IndexSource for ScriptedIndexSource {
    fn next_index(&mut self, _bound: usize) -> usize {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last
    }
}
