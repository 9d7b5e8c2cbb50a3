//! Error taxonomy for the simulator.
//!
//! Two failure families exist, and both are surfaced with enough context
//! to locate the cause:
//! 1. **`ConfigError`** — invalid cache geometry or trace parameters,
//!    raised while loading a configuration; the affected test never runs.
//! 2. **`TraceError`** — an unreadable or malformed trace, raised lazily
//!    as the trace is consumed, carrying the 1-based line number.
//!
//! Nothing here is transient; there are no retries.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A configuration that cannot describe a valid simulation.
///
/// All geometry checks happen at construction time — a hierarchy that
/// passes validation never fails during the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A geometry field that must be a power of two is not.
    #[error("cache level {level}: {field} must be a power of two, got {value}")]
    NotPowerOfTwo {
        /// Level number from the configuration (1 = closest to CPU).
        level: u64,
        /// Which field failed the check.
        field: &'static str,
        /// The offending value.
        value: u64,
    },

    /// A geometry field that must be positive is zero.
    #[error("cache level {level}: {field} must be non-zero")]
    ZeroField {
        /// Level number from the configuration.
        level: u64,
        /// Which field was zero.
        field: &'static str,
    },

    /// The block size exceeds the total cache size.
    #[error("cache level {level}: block size {block_size} exceeds cache size {size}")]
    BlockTooLarge {
        /// Level number from the configuration.
        level: u64,
        /// Configured block size in bytes.
        block_size: u64,
        /// Configured cache size in bytes.
        size: u64,
    },

    /// More ways requested than blocks that fit in the cache.
    #[error("cache level {level}: associativity {associativity} exceeds the {max} blocks the cache holds")]
    AssociativityTooLarge {
        /// Level number from the configuration.
        level: u64,
        /// Configured associativity.
        associativity: u64,
        /// Number of blocks the cache can hold.
        max: u64,
    },

    /// The hierarchy list was empty.
    #[error("cache hierarchy must contain at least one level")]
    EmptyHierarchy,

    /// A synthetic trace read ratio outside `[0, 1]`.
    #[error("read ratio {0} is outside [0, 1]")]
    InvalidReadRatio(f64),

    /// A synthetic trace address range with nothing in it.
    #[error("trace address range is empty ({start:#x}..{end:#x})")]
    EmptyTraceRange {
        /// Inclusive range start.
        start: u64,
        /// Exclusive range end.
        end: u64,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration `{path}`")]
    Io {
        /// Path that failed to open or read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The configuration was not valid JSON for the expected schema.
    #[error("invalid configuration")]
    Parse(#[from] serde_json::Error),
}

/// A trace that cannot be opened or parsed.
///
/// Line numbers are 1-based and count every line of the file, blank
/// lines included.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be opened.
    #[error("failed to open trace `{path}`")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Reading from the trace failed mid-stream.
    #[error("I/O error in trace at line {line}")]
    Io {
        /// Line being read when the error occurred.
        line: u64,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A line that is not `<hexaddr> <R|W>`.
    #[error("trace line {line}: expected `<hexaddr> <R|W>`, got `{content}`")]
    Malformed {
        /// Offending line number.
        line: u64,
        /// The line as read.
        content: String,
    },

    /// An address token that is not valid hexadecimal.
    #[error("trace line {line}: invalid hex address `{token}`")]
    BadAddress {
        /// Offending line number.
        line: u64,
        /// The address token as read.
        token: String,
    },

    /// An access marker other than `R` or `W`.
    #[error("trace line {line}: unknown access type `{token}`")]
    BadKind {
        /// Offending line number.
        line: u64,
        /// The marker token as read.
        token: String,
    },
}

/// Umbrella error for a full test run (load + simulate).
#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The trace failed while being consumed.
    #[error(transparent)]
    Trace(#[from] TraceError),
}
