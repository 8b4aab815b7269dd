//! FIFO (First-In-First-Out) replacement policy.

use std::collections::{HashSet, VecDeque};

use crate::buffer::replacer::Replacer;
use crate::common::PageId;

/// Evicts pages in the order they entered the cache, ignoring re-accesses.
pub struct FifoReplacer {
    /// Queue of page ids in insertion order (front = oldest).
    queue: VecDeque<PageId>,

    /// Set for O(1) membership check.
    in_queue: HashSet<PageId>,
}

impl FifoReplacer {
    /// Create a new FIFO replacer.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            in_queue: HashSet::new(),
        }
    }
}

impl Replacer for FifoReplacer {
    /// For FIFO, only adds to the queue if not already present; a
    /// re-access does not reorder.
    fn record_access(&mut self, pid: PageId) {
        if self.in_queue.insert(pid) {
            self.queue.push_back(pid);
        }
    }

    /// Removal is lazy: the queue entry stays behind and `evict` skips it
    /// once it is no longer a member.
    fn remove(&mut self, pid: PageId) {
        self.in_queue.remove(&pid);
    }

    fn evict(&mut self) -> Option<PageId> {
        while let Some(pid) = self.queue.pop_front() {
            if self.in_queue.remove(&pid) {
                return Some(pid);
            }
            // Stale entry from a lazy remove, skip it.
        }
        None
    }

    fn len(&self) -> usize {
        self.in_queue.len()
    }
}

impl Default for FifoReplacer {
    fn default() -> Self {
        Self::new()
    }
}
