//! Synthetic trace generation.
//!
//! Produces deterministic access streams over an address range without
//! touching disk. Four patterns cover the usual benchmark shapes:
//! sequential and strided walks, uniform random, and a looping pick from
//! a small pool (a working set that fits wherever the pool fits).
//!
//! The generator is a seedable xorshift64, so two traces built with the
//! same parameters produce identical streams.

use crate::common::access::{AccessKind, MemoryAccess};
use crate::common::error::ConfigError;
use crate::config::AccessPattern;

/// Generator seed when the configuration does not pick one.
const DEFAULT_SEED: u64 = 987654321;

/// Step of the sequential walk: one word per access.
const SEQUENTIAL_STEP: u64 = 4;

/// Step of the strided walk.
const STRIDE_STEP: u64 = 64;

/// Upper bound on the looping pattern's address pool.
const LOOP_POOL: u64 = 100;

/// Deterministic generated access stream.
#[derive(Clone, Debug)]
pub struct SyntheticTrace {
    pattern: AccessPattern,
    start: u64,
    span: u64,
    num_accesses: u64,
    read_ratio: f64,
    /// Stream origin: the generator state iteration restarts from.
    origin: u64,
    rng: u64,
    cursor: u64,
    emitted: u64,
    pool: Vec<u64>,
}

impl SyntheticTrace {
    /// Builds a generator over `[start_address, end_address)`.
    ///
    /// # Errors
    ///
    /// Rejects a `read_ratio` outside `[0, 1]` and an empty range.
    pub fn new(
        pattern: AccessPattern,
        start_address: u64,
        end_address: u64,
        num_accesses: u64,
        read_ratio: f64,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&read_ratio) {
            return Err(ConfigError::InvalidReadRatio(read_ratio));
        }
        if start_address >= end_address {
            return Err(ConfigError::EmptyTraceRange {
                start: start_address,
                end: end_address,
            });
        }

        let span = end_address - start_address;
        let mut state = match seed {
            Some(0) | None => DEFAULT_SEED,
            Some(seed) => seed,
        };

        // The looping pool is drawn once, up front; the stream then
        // restarts from the post-pool generator state so reset replays
        // the exact same accesses.
        let mut pool = Vec::new();
        if pattern == AccessPattern::Looping {
            let count = span.min(LOOP_POOL);
            pool.reserve(count as usize);
            for _ in 0..count {
                state = xorshift(state);
                pool.push(start_address + state % span);
            }
        }

        Ok(Self {
            pattern,
            start: start_address,
            span,
            num_accesses,
            read_ratio,
            origin: state,
            rng: state,
            cursor: 0,
            emitted: 0,
            pool,
        })
    }

    /// Rewinds to the first access. The pool and seed are kept, so the
    /// replayed stream is identical.
    pub fn reset(&mut self) {
        self.rng = self.origin;
        self.cursor = 0;
        self.emitted = 0;
    }

    /// Advances the generator and returns the new state.
    fn next_u64(&mut self) -> u64 {
        self.rng = xorshift(self.rng);
        self.rng
    }

    /// A draw in `[0, 1)` from the top bits of the generator.
    fn next_unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// The next address under the configured pattern.
    fn next_address(&mut self) -> u64 {
        match self.pattern {
            AccessPattern::Sequential => {
                let addr = self.start + self.cursor;
                self.cursor = (self.cursor + SEQUENTIAL_STEP) % self.span;
                addr
            }
            AccessPattern::Strided => {
                let addr = self.start + self.cursor;
                self.cursor = (self.cursor + STRIDE_STEP) % self.span;
                addr
            }
            AccessPattern::Random => self.start + self.next_u64() % self.span,
            AccessPattern::Looping => {
                let pick = (self.next_u64() % self.pool.len() as u64) as usize;
                self.pool[pick]
            }
        }
    }
}

impl Iterator for SyntheticTrace {
    type Item = MemoryAccess;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted == self.num_accesses {
            return None;
        }
        self.emitted += 1;
        let address = self.next_address();
        let kind = if self.next_unit() < self.read_ratio {
            AccessKind::Read
        } else {
            AccessKind::Write
        };
        Some(MemoryAccess { address, kind })
    }
}

/// One xorshift64 step.
fn xorshift(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}
