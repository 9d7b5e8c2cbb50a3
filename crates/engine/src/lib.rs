//! Trace-driven cache hierarchy simulator.
//!
//! This crate models how a stream of memory references propagates through
//! a configurable tower of caches backed by main memory:
//! 1. **Cache:** Set-associative levels with LRU/FIFO/Random replacement,
//!    write-back or write-through, write-allocate or not.
//! 2. **Hierarchy:** Inclusive, exclusive, and NINE coordination between
//!    levels — back-invalidation, exclusive promotion, victim caching.
//! 3. **Traces:** File-backed and synthetic access streams.
//! 4. **Metrics:** Per-level hit rates, memory traffic, and the average
//!    memory access time (AMAT).
//!
//! The simulator is functional: no block data is stored, no coherence or
//! prefetching is modeled, and every access executes synchronously in
//! trace order.

/// Set-associative cache level and replacement policies.
pub mod cache;
/// Common types (addresses, accesses, errors).
pub mod common;
/// Simulation configuration (JSON-loaded specs and enums).
pub mod config;
/// Multi-level hierarchy state machine.
pub mod hierarchy;
/// Main memory model.
pub mod memory;
/// Statistics and AMAT derivation.
pub mod metrics;
/// Simulation driver.
pub mod sim;
/// Trace producers.
pub mod trace;

/// Reference type delivered to the hierarchy.
pub use crate::common::access::{AccessKind, MemoryAccess};
/// Umbrella error for a full test run.
pub use crate::common::error::SimError;
/// Root configuration type; load with `SimConfig::from_file`.
pub use crate::config::SimConfig;
/// Cache tower; usually built through `Simulator`.
pub use crate::hierarchy::CacheHierarchy;
/// Final report of a run.
pub use crate::metrics::SimReport;
/// Top-level driver; owns the hierarchy and memory side-by-side.
pub use crate::sim::Simulator;
/// Trace producer dispatch.
pub use crate::trace::Trace;
