//! Set-associative cache level.
//!
//! This module implements one configurable cache level: a set-associative
//! array of block entries plus a replacement policy instance. It models
//! hits, misses, allocation, dirty write-back detection, and the internal
//! transfer operations the hierarchy needs (forced installs and
//! invalidations), without storing any block data.

/// Cache replacement policy implementations (LRU, FIFO, Random).
pub mod policies;

use self::policies::ReplacementPolicy;
use crate::common::access::AccessKind;
use crate::common::addr::AddressLayout;
use crate::common::error::ConfigError;
use crate::config::{CacheSpec, InclusionPolicy, PolicyKind};

/// One block slot: validity, dirtiness, and the block's tag.
///
/// `dirty` implies `valid`; an invalidated entry clears both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// Whether this slot holds a block.
    pub valid: bool,
    /// Whether the held block has been written since installation.
    pub dirty: bool,
    /// Tag of the held block.
    pub tag: u64,
}

/// What one access (or forced install) did to a cache level.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccessOutcome {
    /// Whether the referenced block was resident.
    pub hit: bool,
    /// This level's access latency in cycles, charged hit or miss.
    pub latency: u64,
    /// Whether a valid dirty victim was displaced (write-back levels only).
    pub writeback: bool,
    /// Block base address of a displaced valid victim, if any.
    pub evicted_address: Option<u64>,
    /// Copy of the displaced victim entry, for victim caching.
    pub evicted_entry: Option<CacheEntry>,
}

/// A single set-associative cache level.
///
/// Entries live in a flat set-major array (`set * ways + way`). The level
/// owns its replacement policy and its hit/miss counters; everything
/// cross-level is the hierarchy's business.
#[derive(Clone, Debug)]
pub struct CacheLevel {
    level: u64,
    lines: Vec<CacheEntry>,
    num_sets: usize,
    num_ways: usize,
    layout: AddressLayout,
    latency: u64,
    write_back: bool,
    write_allocate: bool,
    inclusion: InclusionPolicy,
    policy: ReplacementPolicy,
    hits: u64,
    misses: u64,
}

impl CacheLevel {
    /// Builds a cache level from its configuration.
    ///
    /// All geometry checks run here; a constructed level cannot fail.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for non-power-of-two sizes, a block larger
    /// than the cache, or an associativity exceeding the block count.
    pub fn new(spec: &CacheSpec) -> Result<Self, ConfigError> {
        spec.validate()?;

        let num_sets = spec.num_sets() as usize;
        let num_ways = spec.num_ways() as usize;
        let layout = AddressLayout::new(
            spec.block_size.trailing_zeros(),
            (num_sets as u64).trailing_zeros(),
        );

        Ok(Self {
            level: spec.level,
            lines: vec![CacheEntry::default(); num_sets * num_ways],
            num_sets,
            num_ways,
            layout,
            latency: spec.access_latency,
            write_back: spec.write_back,
            write_allocate: spec.write_allocate,
            inclusion: spec.inclusion_policy,
            policy: ReplacementPolicy::new(spec.policy, num_sets, num_ways),
            hits: 0,
            misses: 0,
        })
    }

    /// Pure lookup: the (set, way) holding `addr`, if resident.
    ///
    /// Touches neither the counters nor the replacement policy.
    pub fn probe(&self, addr: u64) -> Option<(usize, usize)> {
        let set = self.layout.index(addr) as usize;
        let tag = self.layout.tag(addr);
        let base = set * self.num_ways;
        (0..self.num_ways).find_map(|way| {
            let line = &self.lines[base + way];
            (line.valid && line.tag == tag).then_some((set, way))
        })
    }

    /// Delivers one user access to this level.
    ///
    /// On a hit the policy is notified and, for write-back levels, a write
    /// sets the dirty bit. On a miss the block is allocated unless this is
    /// a write and the level does not write-allocate; a displaced valid
    /// victim is reported through the outcome, with `writeback` raised
    /// when it was dirty in a write-back level.
    pub fn access(&mut self, addr: u64, kind: AccessKind) -> AccessOutcome {
        let set = self.layout.index(addr) as usize;
        let tag = self.layout.tag(addr);

        let mut outcome = AccessOutcome {
            latency: self.latency,
            ..AccessOutcome::default()
        };

        if let Some((_, way)) = self.probe(addr) {
            self.hits += 1;
            self.policy.on_access(set, way);
            if kind == AccessKind::Write && self.write_back {
                self.lines[set * self.num_ways + way].dirty = true;
            }
            outcome.hit = true;
            return outcome;
        }

        self.misses += 1;
        if kind == AccessKind::Read || self.write_allocate {
            let dirty = kind == AccessKind::Write && self.write_back;
            self.allocate(set, tag, dirty, &mut outcome);
        }
        outcome
    }

    /// Installs a caller-provided entry, bypassing the hit/miss counters.
    ///
    /// Used by the hierarchy for victim caching and exclusive promotion.
    /// If the tag is already resident its way is overwritten in place;
    /// otherwise a victim is selected exactly as on an allocating miss.
    /// The entry keeps the caller's dirty flag; a write into a write-back
    /// level forces it dirty.
    pub fn force_install(&mut self, addr: u64, entry: CacheEntry, kind: AccessKind) -> AccessOutcome {
        let set = self.layout.index(addr) as usize;
        let tag = self.layout.tag(addr);
        let dirty = entry.dirty || (kind == AccessKind::Write && self.write_back);

        let mut outcome = AccessOutcome {
            latency: self.latency,
            ..AccessOutcome::default()
        };

        if let Some((_, way)) = self.probe(addr) {
            self.lines[set * self.num_ways + way] = CacheEntry {
                valid: true,
                dirty,
                tag,
            };
            self.policy.on_access(set, way);
            outcome.hit = true;
            return outcome;
        }

        self.allocate(set, tag, dirty, &mut outcome);
        outcome
    }

    /// Drops the block holding `addr`, if resident. Idempotent.
    ///
    /// The replacement policy is not told; its bookkeeping for the way
    /// goes stale and is refreshed by the next install there.
    pub fn invalidate(&mut self, addr: u64) {
        if let Some((set, way)) = self.probe(addr) {
            self.lines[set * self.num_ways + way] = CacheEntry::default();
        }
    }

    /// A copy of the resident entry for `addr`, if any.
    pub fn get_entry(&self, addr: u64) -> Option<CacheEntry> {
        self.probe(addr)
            .map(|(set, way)| self.lines[set * self.num_ways + way])
    }

    /// Invalidates every entry and zeroes the counters and policy state.
    pub fn reset(&mut self) {
        self.lines.fill(CacheEntry::default());
        self.policy.reset();
        self.hits = 0;
        self.misses = 0;
    }

    /// Selects a victim, records any displacement, and installs the block.
    fn allocate(&mut self, set: usize, tag: u64, dirty: bool, outcome: &mut AccessOutcome) {
        let way = self.policy.victim(set);
        debug_assert!(way < self.num_ways);
        let idx = set * self.num_ways + way;

        let victim = self.lines[idx];
        if victim.valid {
            let victim_addr = self.layout.block_address(victim.tag, set as u64);
            outcome.evicted_address = Some(victim_addr);
            outcome.evicted_entry = Some(victim);
            if self.write_back && victim.dirty {
                outcome.writeback = true;
            }
            tracing::trace!(
                level = self.level,
                address = victim_addr,
                dirty = victim.dirty,
                "evict"
            );
        }

        self.lines[idx] = CacheEntry {
            valid: true,
            dirty,
            tag,
        };
        self.policy.on_access(set, way);
    }

    /// Level number from the configuration (1 = closest to CPU).
    pub fn level(&self) -> u64 {
        self.level
    }

    /// Number of sets.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Ways per set.
    pub fn num_ways(&self) -> usize {
        self.num_ways
    }

    /// Access latency in cycles.
    pub fn latency(&self) -> u64 {
        self.latency
    }

    /// Whether this level is write-back (write-through otherwise).
    pub fn write_back(&self) -> bool {
        self.write_back
    }

    /// Whether this level allocates on write misses.
    pub fn write_allocate(&self) -> bool {
        self.write_allocate
    }

    /// Inclusion relationship with the level above.
    pub fn inclusion(&self) -> InclusionPolicy {
        self.inclusion
    }

    /// Replacement policy variant.
    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    /// User accesses that hit this level.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// User accesses that missed this level.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
