//! Least Recently Used (LRU) replacement.
//!
//! Evicts the block that has gone longest without a touch. Each set keeps
//! a recency stack of installed ways: the front is the most recently used,
//! the back is the victim once the set is full.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(W) where W is the associativity
//!   - `victim()`: O(1)
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Best Case:** Working sets with strong temporal locality
//! - **Worst Case:** Scans larger than the cache capacity (thrashing)

/// LRU state: one recency stack per set, MRU at the front.
///
/// Stacks grow as ways are first touched; a full set's stack holds every
/// way exactly once.
#[derive(Clone, Debug)]
pub struct LruState {
    stacks: Vec<Vec<usize>>,
}

impl LruState {
    /// Creates LRU state for `sets` empty sets.
    pub fn new(sets: usize) -> Self {
        Self {
            stacks: vec![Vec::new(); sets],
        }
    }

    /// Moves `way` to the MRU position, inserting it if unseen.
    pub fn touch(&mut self, set: usize, way: usize) {
        let stack = &mut self.stacks[set];
        if let Some(pos) = stack.iter().position(|&w| w == way) {
            let _ = stack.remove(pos);
        }
        stack.insert(0, way);
    }

    /// The way at the LRU end of the stack.
    ///
    /// Only meaningful once every way of the set has been touched; the
    /// dispatch layer guarantees that by preferring empty ways first.
    pub fn victim(&self, set: usize) -> usize {
        debug_assert!(!self.stacks[set].is_empty());
        self.stacks[set].last().copied().unwrap_or(0)
    }

    /// Forgets all recency state.
    pub fn reset(&mut self) {
        for stack in &mut self.stacks {
            stack.clear();
        }
    }
}
