//! Cache replacement policies.
//!
//! Victim selection for set-associative caches, as a tagged variant with a
//! thin dispatch layer rather than a trait object: every variant is known
//! at compile time and a cache must be cheaply cloneable together with its
//! policy state.
//!
//! The dispatch layer owns the bookkeeping every variant shares — which
//! ways of each set the policy has seen occupied — and applies the common
//! rule that an empty way is always preferred over evicting a valid block,
//! lowest-numbered empty way first. Variants only decide the order among
//! fully occupied ways.
//!
//! # Variants
//!
//! - `Lru`: Least Recently Used.
//! - `Fifo`: First-In, First-Out (oldest installed block).
//! - `Random`: Uniform choice, seedable for reproducibility.

/// First-In, First-Out replacement state.
pub mod fifo;

/// Least Recently Used replacement state.
pub mod lru;

/// Random replacement state.
pub mod random;

pub use fifo::FifoState;
pub use lru::LruState;
pub use random::RandomState;

use crate::config::PolicyKind;

/// Variant-specific policy state.
#[derive(Clone, Debug)]
enum PolicyState {
    Lru(LruState),
    Fifo(FifoState),
    Random(RandomState),
}

/// A replacement policy instance for one cache level.
///
/// Tracks per-set occupancy as the policy's own view of the world: a way
/// becomes occupied the first time [`ReplacementPolicy::on_access`] names
/// it and stays occupied until [`ReplacementPolicy::reset`]. Invalidations
/// in the cache array are deliberately not reflected here — stale entries
/// are tolerated and reused naturally on the next fill of that way.
#[derive(Clone, Debug)]
pub struct ReplacementPolicy {
    kind: PolicyKind,
    ways: usize,
    occupied: Vec<Vec<bool>>,
    state: PolicyState,
}

impl ReplacementPolicy {
    /// Creates a policy of the given kind for a `sets` × `ways` geometry.
    pub fn new(kind: PolicyKind, sets: usize, ways: usize) -> Self {
        let state = match kind {
            PolicyKind::Lru => PolicyState::Lru(LruState::new(sets)),
            PolicyKind::Fifo => PolicyState::Fifo(FifoState::new(sets)),
            PolicyKind::Random => PolicyState::Random(RandomState::new()),
        };
        Self {
            kind,
            ways,
            occupied: vec![vec![false; ways]; sets],
            state,
        }
    }

    /// Like [`ReplacementPolicy::new`], but seeds the Random variant for
    /// reproducible victim streams. The seed is ignored by LRU and FIFO.
    pub fn with_seed(kind: PolicyKind, sets: usize, ways: usize, seed: u64) -> Self {
        let mut policy = Self::new(kind, sets, ways);
        if kind == PolicyKind::Random {
            policy.state = PolicyState::Random(RandomState::with_seed(seed));
        }
        policy
    }

    /// The variant this instance dispatches to.
    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    /// Records that `way` was just touched or installed.
    pub fn on_access(&mut self, set: usize, way: usize) {
        self.occupied[set][way] = true;
        match &mut self.state {
            PolicyState::Lru(lru) => lru.touch(set, way),
            PolicyState::Fifo(fifo) => fifo.record_fill(set, way),
            PolicyState::Random(_) => {}
        }
    }

    /// Selects the way to replace in `set`.
    ///
    /// Any way the policy has never seen occupied wins over a valid
    /// victim, lowest way number first. Only a fully occupied set defers
    /// to the variant's ordering.
    pub fn victim(&mut self, set: usize) -> usize {
        if let Some(way) = self.occupied[set].iter().position(|&o| !o) {
            return way;
        }
        match &mut self.state {
            PolicyState::Lru(lru) => lru.victim(set),
            PolicyState::Fifo(fifo) => fifo.victim(set),
            PolicyState::Random(random) => random.victim(self.ways),
        }
    }

    /// Forgets all state, as if freshly constructed.
    pub fn reset(&mut self) {
        for set in &mut self.occupied {
            set.fill(false);
        }
        match &mut self.state {
            PolicyState::Lru(lru) => lru.reset(),
            PolicyState::Fifo(fifo) => fifo.reset(),
            PolicyState::Random(random) => random.reset(),
        }
    }
}
