//! First-In, First-Out (FIFO) replacement.
//!
//! Evicts the oldest installed block in a set, regardless of how recently
//! it was accessed. Each set keeps its ways in insertion order: new
//! installs append at the back, victims come off the front. Hits never
//! reorder the queue.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `record_fill()`: O(W) where W is the associativity
//!   - `victim()`: O(1)
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Best Case:** Streaming accesses where all blocks age equally
//! - **Worst Case:** Hot blocks that are as old as the cold ones around them

use std::collections::VecDeque;

/// FIFO state: one insertion-order queue per set, oldest at the front.
#[derive(Clone, Debug)]
pub struct FifoState {
    queues: Vec<VecDeque<usize>>,
}

impl FifoState {
    /// Creates FIFO state for `sets` empty sets.
    pub fn new(sets: usize) -> Self {
        Self {
            queues: vec![VecDeque::new(); sets],
        }
    }

    /// Records a way on its first observation; later touches are no-ops.
    pub fn record_fill(&mut self, set: usize, way: usize) {
        let queue = &mut self.queues[set];
        if !queue.contains(&way) {
            queue.push_back(way);
        }
    }

    /// Takes the oldest way off the front and re-queues it at the back.
    ///
    /// The rotation reflects what the caller is about to do: the selected
    /// way receives the newest block in the set, making it the youngest
    /// insertion.
    pub fn victim(&mut self, set: usize) -> usize {
        let queue = &mut self.queues[set];
        match queue.pop_front() {
            Some(way) => {
                queue.push_back(way);
                way
            }
            None => 0,
        }
    }

    /// Forgets all insertion order.
    pub fn reset(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
    }
}
