//! Multi-level cache hierarchy.
//!
//! Coordinates an ordered tower of [`CacheLevel`]s under per-level
//! inclusion policies. Every cross-level action — exclusive promotion,
//! victim caching, inclusive back-invalidation, write-through
//! propagation — happens here, by moving entry values between levels;
//! the levels themselves never see each other.
//!
//! Main memory is not part of the hierarchy: a full miss is reported to
//! the caller, which charges the memory latency and traffic itself.

use crate::cache::{CacheEntry, CacheLevel};
use crate::common::access::AccessKind;
use crate::common::error::ConfigError;
use crate::config::{CacheSpec, InclusionPolicy};

/// What one reference did to the hierarchy as a whole.
#[derive(Clone, Copy, Debug, Default)]
pub struct HierarchyOutcome {
    /// Summed latency of every cache level the reference touched.
    /// Main-memory latency is the caller's to add on a miss.
    pub latency: u64,
    /// Whether any cache level satisfied the reference.
    pub hit: bool,
    /// Dirty victims displaced from the last cache level; each is one
    /// block written back to main memory.
    pub memory_writebacks: u64,
    /// Write-through stores that fell past the last cache level and
    /// must land in main memory.
    pub memory_write_throughs: u64,
}

/// An ordered tower of cache levels, closest to the CPU first.
#[derive(Clone, Debug)]
pub struct CacheHierarchy {
    levels: Vec<CacheLevel>,
}

impl CacheHierarchy {
    /// Builds a hierarchy from already-constructed levels.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyHierarchy`] for an empty list.
    pub fn new(levels: Vec<CacheLevel>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::EmptyHierarchy);
        }
        Ok(Self { levels })
    }

    /// Builds a hierarchy straight from configuration.
    pub fn from_specs(specs: &[CacheSpec]) -> Result<Self, ConfigError> {
        let levels = specs
            .iter()
            .map(CacheLevel::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(levels)
    }

    /// The levels, closest to the CPU first.
    pub fn levels(&self) -> &[CacheLevel] {
        &self.levels
    }

    /// Invalidates every level and zeroes all counters.
    pub fn reset(&mut self) {
        for level in &mut self.levels {
            level.reset();
        }
    }

    /// Drives one memory reference through the tower.
    ///
    /// The reference enters at level 1 and descends until some level hits
    /// or every level has missed. Along the way the inclusion policies
    /// insert their transfers:
    ///
    /// - an **exclusive** lower-level hit moves the block up to level 1
    ///   and removes the lower copy; on the miss path an exclusive level
    ///   immediately drops the copy its allocation created, and a block
    ///   displaced from level 1 is installed into an exclusive level 2
    ///   (victim caching) unless it is the very block being fetched;
    /// - an **inclusive** level that displaces a block while allocating
    ///   invalidates that block in every level above it;
    /// - a **NINE** level allocates on its own misses and constrains
    ///   nothing.
    ///
    /// Writes satisfied at a write-through level repeat as synthetic
    /// write accesses at the next level down; a store that falls past the
    /// last level is surfaced in the outcome for the caller to charge to
    /// main memory.
    pub fn access(&mut self, address: u64, kind: AccessKind) -> HierarchyOutcome {
        let n = self.levels.len();
        let mut outcome = HierarchyOutcome::default();

        // Observed before anything mutates: an exclusive lower-level hit
        // is only legal when the block was absent up here.
        let was_in_first = self.levels[0].probe(address).is_some();

        let first = self.levels[0].access(address, kind);
        outcome.latency += first.latency;
        outcome.hit = first.hit;
        if n == 1 && first.writeback {
            outcome.memory_writebacks += 1;
        }

        // Single-slot tracker for the most recent displacement from
        // level 1; consumed by victim caching after the walk.
        let mut displaced: Option<(u64, CacheEntry)> = first.evicted_address.zip(first.evicted_entry);

        // The level that ended up satisfying the reference.
        let mut satisfied_at = first.hit.then_some(0usize);

        if !first.hit {
            for i in 1..n {
                let step = self.levels[i].access(address, kind);
                outcome.latency += step.latency;

                if step.hit {
                    if self.levels[i].inclusion() == InclusionPolicy::Exclusive {
                        debug_assert!(!was_in_first, "exclusive hit below a resident copy");
                        // Move the block up; the lower copy must go.
                        if let Some(entry) = self.levels[i].get_entry(address) {
                            self.levels[i].invalidate(address);
                            tracing::trace!(
                                from = self.levels[i].level(),
                                address,
                                "exclusive promotion"
                            );
                            let moved = self.levels[0].force_install(address, entry, kind);
                            if let Some(pair) = moved.evicted_address.zip(moved.evicted_entry) {
                                displaced = Some(pair);
                            }
                        }
                        satisfied_at = Some(0);
                    } else {
                        satisfied_at = Some(i);
                    }
                    outcome.hit = true;
                    break;
                }

                // Miss: the access above already applied this level's own
                // allocation decision; apply the inclusion consequences.
                if i == n - 1 && step.writeback {
                    outcome.memory_writebacks += 1;
                }
                match self.levels[i].inclusion() {
                    InclusionPolicy::Inclusive => {
                        if let Some(evicted) = step.evicted_address {
                            self.back_invalidate(evicted, i);
                        }
                    }
                    InclusionPolicy::Exclusive => {
                        // The block belongs upstream only; drop the copy
                        // the allocating miss just created.
                        self.levels[i].invalidate(address);
                    }
                    InclusionPolicy::Nine => {}
                }
            }
        }

        // Victim caching: a block displaced from level 1 lands in an
        // exclusive level 2, unless it is the block just fetched.
        if n > 1 && self.levels[1].inclusion() == InclusionPolicy::Exclusive {
            if let Some((victim_addr, victim_entry)) = displaced.take() {
                if victim_addr != address {
                    tracing::trace!(
                        address = victim_addr,
                        "victim cached into level 2"
                    );
                    let moved =
                        self.levels[1]
                            .force_install(victim_addr, victim_entry, AccessKind::Write);
                    if n == 2 && moved.writeback {
                        outcome.memory_writebacks += 1;
                    }
                }
            }
        }

        // Write-through: repeat the store at each next level down until a
        // write-back level absorbs it or it falls out of the tower.
        if kind == AccessKind::Write {
            if let Some(mut at) = satisfied_at {
                while !self.levels[at].write_back() {
                    let next = at + 1;
                    if next >= n {
                        outcome.memory_write_throughs += 1;
                        break;
                    }
                    let step = self.levels[next].access(address, AccessKind::Write);
                    outcome.latency += step.latency;
                    if next == n - 1 && step.writeback {
                        outcome.memory_writebacks += 1;
                    }
                    match self.levels[next].inclusion() {
                        InclusionPolicy::Inclusive => {
                            if let Some(evicted) = step.evicted_address {
                                self.back_invalidate(evicted, next);
                            }
                        }
                        InclusionPolicy::Exclusive => {
                            if !step.hit {
                                self.levels[next].invalidate(address);
                            }
                        }
                        InclusionPolicy::Nine => {}
                    }
                    at = next;
                }
            }
        }

        outcome
    }

    /// Removes `address` from every level above `from_level`.
    ///
    /// Keeps the inclusive invariant: a block leaving a lower level must
    /// also leave everything stacked on top of it.
    fn back_invalidate(&mut self, address: u64, from_level: usize) {
        tracing::trace!(
            from = self.levels[from_level].level(),
            address,
            "back-invalidate"
        );
        for level in &mut self.levels[..from_level] {
            level.invalidate(address);
        }
    }
}
