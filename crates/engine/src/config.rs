//! Configuration system for the cache simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize a simulation run. It provides:
//! 1. **Structures:** One `SimConfig` per test, holding the ordered cache
//!    hierarchy, the main-memory latency, and the trace to drive.
//! 2. **Enums:** Cache organization, replacement policy, inclusion policy,
//!    and synthetic access pattern, with forgiving wire-name aliases.
//! 3. **Validation:** Every geometry and range check runs at load time and
//!    raises [`ConfigError`]; a configuration that loads cleanly never
//!    fails mid-run.
//!
//! Configuration is supplied as JSON, one file per test.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Default configuration constants.
mod defaults {
    /// Cache access latency in cycles when not specified.
    pub const CACHE_LATENCY: u64 = 1;

    /// Associativity when not specified (direct-mapped and
    /// fully-associative organizations ignore it anyway).
    pub const ASSOCIATIVITY: u64 = 1;

    /// Read share of a synthetic trace when not specified.
    pub const READ_RATIO: f64 = 0.5;
}

/// How a cache maps block addresses onto its entry array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Organization {
    /// One way per set; a block has exactly one home slot.
    DirectMapped,
    /// `associativity` ways per set.
    SetAssociative,
    /// A single set spanning the whole cache.
    FullyAssociative,
}

/// Victim-selection algorithm for a full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyKind {
    /// Least Recently Used.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// First In First Out (oldest installed block first).
    #[serde(alias = "Fifo")]
    Fifo,
    /// Uniformly random among occupied ways.
    #[serde(alias = "Random")]
    Random,
}

impl PolicyKind {
    /// Resolves a policy name; unrecognized names fall back to LRU.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "FIFO" => Self::Fifo,
            "RANDOM" => Self::Random,
            _ => Self::Lru,
        }
    }
}

/// Relationship a cache level maintains with the level above it.
///
/// Meaningful from level 2 onward; level 1 has nothing above it to
/// relate to and the field is ignored there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum InclusionPolicy {
    /// Every block in the upper level is also present here. Evictions
    /// here invalidate the upper levels.
    #[default]
    Inclusive,
    /// No block is present both here and in the upper level. Hits here
    /// move the block up; upper-level victims land here.
    Exclusive,
    /// Non-inclusive, non-exclusive: no cross-level constraint.
    #[serde(rename = "NINE", alias = "Nine")]
    Nine,
}

impl std::fmt::Display for InclusionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inclusive => write!(f, "Inclusive"),
            Self::Exclusive => write!(f, "Exclusive"),
            Self::Nine => write!(f, "NINE"),
        }
    }
}

/// Address sequence shape of a synthetic trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AccessPattern {
    /// Word-by-word walk of the range, wrapping at the end.
    Sequential,
    /// Uniformly random addresses in the range.
    Random,
    /// 64-byte strides through the range, wrapping at the end.
    Strided,
    /// Uniform picks from a small precomputed pool of addresses.
    Looping,
}

/// Root configuration: one simulated test.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::{InclusionPolicy, PolicyKind, SimConfig};
///
/// let json = r#"{
///     "test_name": "two-level-lru",
///     "cache_hierarchy": [
///         {
///             "level": 1,
///             "organization": "SetAssociative",
///             "size": 32768,
///             "block_size": 64,
///             "associativity": 4,
///             "policy": "LRU",
///             "access_latency": 1,
///             "write_back": true,
///             "write_allocate": true
///         },
///         {
///             "level": 2,
///             "organization": "SetAssociative",
///             "size": 262144,
///             "block_size": 64,
///             "associativity": 8,
///             "policy": "LRU",
///             "access_latency": 10,
///             "write_back": true,
///             "write_allocate": true,
///             "inclusion_policy": "Exclusive"
///         }
///     ],
///     "memory": { "access_latency": 100 },
///     "trace": {
///         "synthetic": {
///             "pattern": "Strided",
///             "start_address": 0,
///             "end_address": 1048576,
///             "num_accesses": 100000,
///             "read_ratio": 0.7
///         }
///     }
/// }"#;
///
/// let config = SimConfig::from_json(json).unwrap();
/// assert_eq!(config.cache_hierarchy.len(), 2);
/// assert_eq!(config.cache_hierarchy[0].policy, PolicyKind::Lru);
/// assert_eq!(
///     config.cache_hierarchy[1].inclusion_policy,
///     InclusionPolicy::Exclusive
/// );
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Name shown in reports and comparison columns.
    pub test_name: String,

    /// Cache levels in order, closest to the CPU first. Never empty.
    pub cache_hierarchy: Vec<CacheSpec>,

    /// Main-memory parameters.
    pub memory: MemorySpec,

    /// Trace to drive through the hierarchy.
    pub trace: TraceSpec,
}

impl SimConfig {
    /// Loads and validates a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks everything that must hold before a run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_hierarchy.is_empty() {
            return Err(ConfigError::EmptyHierarchy);
        }
        for spec in &self.cache_hierarchy {
            spec.validate()?;
        }
        self.trace.validate()
    }
}

/// One cache level.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSpec {
    /// Level number, 1 = closest to the CPU. Used for reporting and
    /// error context.
    pub level: u64,

    /// Mapping organization.
    pub organization: Organization,

    /// Total capacity in bytes. Power of two.
    pub size: u64,

    /// Block (line) size in bytes. Power of two, at most `size`.
    pub block_size: u64,

    /// Ways per set. Only consulted for `SetAssociative`.
    #[serde(default = "CacheSpec::default_associativity")]
    pub associativity: u64,

    /// Replacement policy.
    #[serde(default)]
    pub policy: PolicyKind,

    /// Access latency in cycles, charged on every access to this level.
    #[serde(default = "CacheSpec::default_latency")]
    pub access_latency: u64,

    /// Write-back when true, write-through otherwise.
    #[serde(default = "CacheSpec::default_true")]
    pub write_back: bool,

    /// Allocate a block on write miss when true.
    #[serde(default = "CacheSpec::default_true")]
    pub write_allocate: bool,

    /// Inclusion relationship with the level above. Ignored on level 1.
    #[serde(default)]
    pub inclusion_policy: InclusionPolicy,
}

impl CacheSpec {
    /// Returns the default cache access latency in cycles.
    fn default_latency() -> u64 {
        defaults::CACHE_LATENCY
    }

    /// Returns the default associativity.
    fn default_associativity() -> u64 {
        defaults::ASSOCIATIVITY
    }

    /// Returns `true`, the default for both write flags.
    fn default_true() -> bool {
        true
    }

    /// Validates the geometry of this level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let require_pow2 = |field: &'static str, value: u64| -> Result<(), ConfigError> {
            if value == 0 {
                return Err(ConfigError::ZeroField {
                    level: self.level,
                    field,
                });
            }
            if !value.is_power_of_two() {
                return Err(ConfigError::NotPowerOfTwo {
                    level: self.level,
                    field,
                    value,
                });
            }
            Ok(())
        };

        require_pow2("size", self.size)?;
        require_pow2("block_size", self.block_size)?;
        if self.block_size > self.size {
            return Err(ConfigError::BlockTooLarge {
                level: self.level,
                block_size: self.block_size,
                size: self.size,
            });
        }
        if self.organization == Organization::SetAssociative {
            require_pow2("associativity", self.associativity)?;
            let blocks = self.size / self.block_size;
            if self.associativity > blocks {
                return Err(ConfigError::AssociativityTooLarge {
                    level: self.level,
                    associativity: self.associativity,
                    max: blocks,
                });
            }
        }
        Ok(())
    }

    /// Number of sets this geometry derives.
    pub fn num_sets(&self) -> u64 {
        match self.organization {
            Organization::DirectMapped => self.size / self.block_size,
            Organization::FullyAssociative => 1,
            Organization::SetAssociative => self.size / (self.block_size * self.associativity),
        }
    }

    /// Number of ways per set this geometry derives.
    pub fn num_ways(&self) -> u64 {
        match self.organization {
            Organization::DirectMapped => 1,
            Organization::FullyAssociative => self.size / self.block_size,
            Organization::SetAssociative => self.associativity,
        }
    }
}

/// Main-memory parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct MemorySpec {
    /// Fixed access latency in cycles.
    pub access_latency: u64,
}

/// Trace source, either a file on disk or a synthetic generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSpec {
    /// A text trace file of `<hexaddr> <R|W>` lines.
    File {
        /// Path to the trace file.
        path: PathBuf,
    },
    /// A generated access stream.
    Synthetic {
        /// Shape of the address sequence.
        pattern: AccessPattern,
        /// Inclusive start of the address range.
        start_address: u64,
        /// Exclusive end of the address range.
        end_address: u64,
        /// Number of accesses to produce.
        num_accesses: u64,
        /// Fraction of accesses that are reads, in `[0, 1]`.
        #[serde(default = "TraceSpec::default_read_ratio")]
        read_ratio: f64,
        /// Generator seed for reproducible streams.
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl TraceSpec {
    /// Returns the default read share of a synthetic trace.
    fn default_read_ratio() -> f64 {
        defaults::READ_RATIO
    }

    /// Validates the trace parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::File { .. } => Ok(()),
            Self::Synthetic {
                start_address,
                end_address,
                read_ratio,
                ..
            } => {
                if !(0.0..=1.0).contains(&read_ratio) {
                    return Err(ConfigError::InvalidReadRatio(read_ratio));
                }
                if start_address >= end_address {
                    return Err(ConfigError::EmptyTraceRange {
                        start: start_address,
                        end: end_address,
                    });
                }
                Ok(())
            }
        }
    }
}
