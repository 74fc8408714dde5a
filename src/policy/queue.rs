//! Lazy-deletion priority queue
//!
//! **Problem**: re-sorting every candidate after each outcome is O(N log N).
//!
//! **Solution**: push a fresh `(score, sequence, name)` entry on every change
//! and leave the superseded one in the heap. An entry is live only while its
//! sequence equals the owning candidate's latest sequence; anything else is
//! discarded when it surfaces.
//!
//! Stale entries are compacted once they outnumber live ones, so the heap
//! stays within a constant factor of the candidate count.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::scoring::priority_order;

/// Heap entry. `Ord` is arranged so `BinaryHeap` (a max-heap) pops the
/// highest score first and, on equal scores, the earliest sequence.
#[derive(Debug, Clone)]
pub(crate) struct QueueEntry {
    pub(crate) score: f64,
    pub(crate) sequence: u64,
    pub(crate) name: String,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse of the priority order: "first to run" is the heap maximum
        priority_order((other.score, other.sequence), (self.score, self.sequence))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority structure over negated effective scores.
#[derive(Debug, Default)]
pub(crate) struct PriorityQueue {
    heap: BinaryHeap<QueueEntry>,
    next_sequence: u64,
}

impl PriorityQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push an entry and return the sequence it was assigned.
    pub(crate) fn push(&mut self, name: &str, score: f64) -> u64 {
        self.next_sequence += 1;
        let sequence = self.next_sequence;
        self.heap.push(QueueEntry {
            score,
            sequence,
            name: name.to_string(),
        });
        sequence
    }

    /// Pop entries until `is_live` accepts one.
    pub(crate) fn pop_live<F>(&mut self, mut is_live: F) -> Option<QueueEntry>
    where
        F: FnMut(&QueueEntry) -> bool,
    {
        while let Some(entry) = self.heap.pop() {
            if is_live(&entry) {
                return Some(entry);
            }
        }
        None
    }

    /// Drop stale entries when they outnumber `live`. Returns how many went.
    pub(crate) fn compact_if_needed<F>(&mut self, live: usize, is_live: F) -> usize
    where
        F: FnMut(&QueueEntry) -> bool,
    {
        if self.heap.len() <= live.saturating_mul(2).max(16) {
            return 0;
        }
        let before = self.heap.len();
        self.heap.retain(is_live);
        before - self.heap.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.heap.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_highest_score_first() {
        let mut queue = PriorityQueue::new();
        queue.push("low", 1.0);
        queue.push("high", 9.0);
        queue.push("mid", 5.0);

        let order: Vec<String> = std::iter::from_fn(|| queue.pop_live(|_| true))
            .map(|e| e.name)
            .collect();
        assert_eq!(order, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_ties_go_to_earliest_push() {
        let mut queue = PriorityQueue::new();
        queue.push("first", 2.0);
        queue.push("second", 2.0);
        queue.push("third", 2.0);

        assert_eq!(queue.pop_live(|_| true).unwrap().name, "first");
        assert_eq!(queue.pop_live(|_| true).unwrap().name, "second");
    }

    #[test]
    fn test_pop_live_skips_stale() {
        let mut queue = PriorityQueue::new();
        let stale = queue.push("a", 10.0);
        queue.push("b", 1.0);

        let entry = queue.pop_live(|e| e.sequence != stale).unwrap();
        assert_eq!(entry.name, "b");
        assert!(queue.pop_live(|_| true).is_none());
    }

    #[test]
    fn test_nan_scores_sink() {
        let mut queue = PriorityQueue::new();
        queue.push("nan", f64::NAN);
        queue.push("neg", -1.0);
        assert_eq!(queue.pop_live(|_| true).unwrap().name, "neg");
    }

    #[test]
    fn test_compaction_keeps_live_entries() {
        let mut queue = PriorityQueue::new();
        let mut latest = 0;
        for i in 0..40 {
            latest = queue.push("a", f64::from(i));
        }
        let removed = queue.compact_if_needed(1, |e| e.sequence == latest);
        assert_eq!(removed, 39);
        assert_eq!(queue.len(), 1);
        assert_eq!(latest, 40);
    }

    #[test]
    fn test_compaction_skipped_below_threshold() {
        let mut queue = PriorityQueue::new();
        queue.push("a", 1.0);
        queue.push("a", 2.0);
        assert_eq!(queue.compact_if_needed(1, |_| false), 0);
        assert_eq!(queue.len(), 2);
    }
}
