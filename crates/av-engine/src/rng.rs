//! Deterministic random source for spin resolution
//!
//! The engine never touches a raw generator. Everything it draws goes through
//! [`RandomSource`], which exposes only the operations a spin needs. The
//! production implementation is [`SpinRng`] (ChaCha8); tests can substitute
//! [`SequenceRng`] without touching engine logic.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Narrow random capability used by the engine
pub trait RandomSource {
    /// Uniform float in `[0.0, 1.0)`
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `[lo, hi]` (both inclusive). `lo > hi` yields `lo`.
    fn range_inclusive(&mut self, lo: usize, hi: usize) -> usize;

    /// Bernoulli trial: `true` with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element uniformly
    fn choose<'a, T>(&mut self, items: &'a [T]) -> EngineResult<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            return Err(EngineError::EmptyChoice);
        }
        let idx = self.range_inclusive(0, items.len() - 1);
        Ok(&items[idx])
    }

    /// Index into a cumulative distribution.
    ///
    /// `cumulative` must be non-decreasing and end at the total weight. Draws
    /// one float, scales it by the total and returns the first index whose
    /// threshold is > the draw, so zero-weight entries are never picked.
    fn weighted_index(&mut self, cumulative: &[f64]) -> EngineResult<usize>
    where
        Self: Sized,
    {
        let Some(&total) = cumulative.last() else {
            return Err(EngineError::EmptyChoice);
        };
        if total.is_nan() || total <= 0.0 {
            return Err(EngineError::InvalidWeights(format!(
                "total weight must be positive, got {total}"
            )));
        }
        let r = self.next_f64() * total;
        let idx = cumulative.partition_point(|&c| c <= r);
        Ok(idx.min(cumulative.len() - 1))
    }

    /// Fisher-Yates shuffle in place
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.range_inclusive(0, i);
            items.swap(i, j);
        }
    }
}

/// Saved generator position, restorable with [`SpinRng::restore`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSnapshot {
    pub seed: [u8; 32],
    pub stream: u64,
    pub word_pos: u128,
    pub call_count: u64,
}

/// ChaCha8-backed spin RNG
#[derive(Debug, Clone)]
pub struct SpinRng {
    inner: ChaCha8Rng,
    seed: Option<u64>,
    call_count: u64,
}

impl SpinRng {
    /// Create from a 64-bit seed
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
            call_count: 0,
        }
    }

    /// Create from OS entropy (non-reproducible)
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_os_rng(),
            seed: None,
            call_count: 0,
        }
    }

    /// Create the generator for one parallel worker.
    ///
    /// The base seed keys the cipher and the worker index selects the ChaCha
    /// stream, so two workers of the same run never share a keystream and the
    /// mapping never depends on wall-clock or scheduling.
    pub fn for_worker(base_seed: u64, worker_index: u64) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(base_seed);
        inner.set_stream(worker_index);
        Self {
            inner,
            seed: Some(base_seed),
            call_count: 0,
        }
    }

    /// Seed this generator was created from (`None` for entropy)
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Number of draws made so far
    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Capture the full generator position
    pub fn snapshot(&self) -> RngSnapshot {
        RngSnapshot {
            seed: self.inner.get_seed(),
            stream: self.inner.get_stream(),
            word_pos: self.inner.get_word_pos(),
            call_count: self.call_count,
        }
    }

    /// Return to a previously captured position
    pub fn restore(&mut self, snapshot: &RngSnapshot) {
        let mut inner = ChaCha8Rng::from_seed(snapshot.seed);
        inner.set_stream(snapshot.stream);
        inner.set_word_pos(snapshot.word_pos);
        self.inner = inner;
        self.call_count = snapshot.call_count;
    }
}

impl RandomSource for SpinRng {
    fn next_f64(&mut self) -> f64 {
        self.call_count += 1;
        self.inner.random::<f64>()
    }

    fn range_inclusive(&mut self, lo: usize, hi: usize) -> usize {
        self.call_count += 1;
        if lo >= hi {
            return lo;
        }
        self.inner.random_range(lo..=hi)
    }
}

/// Scripted source cycling through fixed floats
///
/// Integer draws map the float onto the requested range, so a script of
/// floats fully determines every engine decision.
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRng {
    /// Values are clamped into `[0.0, 1.0)`. An empty script yields zeros.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }

    /// Number of values consumed
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRng {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            self.cursor += 1;
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }

    fn range_inclusive(&mut self, lo: usize, hi: usize) -> usize {
        let r = self.next_f64();
        if lo >= hi {
            return lo;
        }
        let span = (hi - lo + 1) as f64;
        lo + ((r * span) as usize).min(hi - lo)
    }
}

/// First `count` floats drawn from a fresh generator with `seed`
pub fn verify_determinism(seed: u64, count: usize) -> Vec<f64> {
    let mut rng = SpinRng::new(seed);
    (0..count).map(|_| rng.next_f64()).collect()
}
