//! Common types shared across the simulation core.
//!
//! This module collects the vocabulary the rest of the crate builds on:
//! 1. **Addresses:** Bit-field decomposition of 64-bit addresses (`addr`).
//! 2. **Accesses:** The read/write reference type the hierarchy consumes (`access`).
//! 3. **Errors:** Configuration and trace error taxonomies (`error`).

/// Memory reference types (`AccessKind`, `MemoryAccess`).
pub mod access;
/// Address bit-field decomposition and reconstruction.
pub mod addr;
/// Error taxonomy for configuration loading and trace consumption.
pub mod error;

pub use access::{AccessKind, MemoryAccess};
pub use addr::AddressLayout;
pub use error::{ConfigError, SimError, TraceError};
