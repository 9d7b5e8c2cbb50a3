//! Trace producers.
//!
//! A trace is a lazy, finite stream of [`MemoryAccess`] values. Two
//! producers exist, dispatched as a tagged variant like the replacement
//! policies:
//! 1. **File** — `<hexaddr> <R|W>` lines read lazily from disk.
//! 2. **Synthetic** — generated address patterns with a configurable
//!    read/write mix, seedable for reproducibility.
//!
//! Producers can be rewound with [`Trace::reset`] and duplicated with
//! [`Trace::try_clone`]; cloning a file trace reopens the file, so it
//! can fail.

/// File-backed trace producer.
pub mod file;

/// Synthetic trace generation.
pub mod synthetic;

pub use file::FileTrace;
pub use synthetic::SyntheticTrace;

use crate::common::access::MemoryAccess;
use crate::common::error::{SimError, TraceError};
use crate::config::TraceSpec;

/// A trace source, ready to iterate.
#[derive(Debug)]
pub enum Trace {
    /// Accesses parsed from a trace file.
    File(FileTrace),
    /// Accesses produced by a generator.
    Synthetic(SyntheticTrace),
}

impl Trace {
    /// Builds the producer a configuration asks for.
    ///
    /// # Errors
    ///
    /// A missing trace file or invalid generator parameters surface here,
    /// before any access is produced.
    pub fn from_spec(spec: &TraceSpec) -> Result<Self, SimError> {
        match spec {
            TraceSpec::File { path } => Ok(Self::File(FileTrace::open(path)?)),
            TraceSpec::Synthetic {
                pattern,
                start_address,
                end_address,
                num_accesses,
                read_ratio,
                seed,
            } => Ok(Self::Synthetic(SyntheticTrace::new(
                *pattern,
                *start_address,
                *end_address,
                *num_accesses,
                *read_ratio,
                *seed,
            )?)),
        }
    }

    /// Rewinds to the first access.
    pub fn reset(&mut self) -> Result<(), TraceError> {
        match self {
            Self::File(trace) => trace.reset(),
            Self::Synthetic(trace) => {
                trace.reset();
                Ok(())
            }
        }
    }

    /// An independent, rewound copy of this producer.
    pub fn try_clone(&self) -> Result<Self, TraceError> {
        match self {
            Self::File(trace) => Ok(Self::File(trace.try_clone()?)),
            Self::Synthetic(trace) => {
                let mut copy = trace.clone();
                copy.reset();
                Ok(Self::Synthetic(copy))
            }
        }
    }
}

impl Iterator for Trace {
    type Item = Result<MemoryAccess, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::File(trace) => trace.next(),
            Self::Synthetic(trace) => trace.next().map(Ok),
        }
    }
}
