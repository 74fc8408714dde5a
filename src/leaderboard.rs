//! Leaderboard - ranked snapshot of every live candidate
//!
//! **Problem**: sorting all candidates for a top-10 view is O(N log N).
//!
//! **Solution**: bounded-heap Top-K selection, O(N log K). When `k >= N`
//! all rows are sorted instead.
//!
//! Rows come out in exactly the order repeated `pop_highest_priority` calls
//! would produce: score descending, ties to the earlier sequence.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::policy::scoring::{effective_score, priority_order};
use crate::policy::Candidate;
use crate::PolicyConfig;

/// One ranked leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// 1-based position
    pub rank: usize,
    /// Candidate name
    pub name: String,
    /// Effective score at query time
    pub score: f64,
    /// Gain estimate
    pub expected_gain: f64,
    /// Runtime estimate
    pub expected_runtime: f64,
    /// Overfit risk estimate
    pub overfit_risk: f64,
    /// Recorded outcomes
    pub trials: u64,
    /// Recorded successes
    pub success_count: u64,
}

// Heap item ordered so the *worst* kept row sits at the top of the max-heap
#[derive(Debug)]
struct RankedItem<'a> {
    score: f64,
    candidate: &'a Candidate,
}

impl RankedItem<'_> {
    fn key(&self) -> (f64, u64) {
        (self.score, self.candidate.sequence())
    }
}

impl PartialEq for RankedItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedItem<'_> {}

impl Ord for RankedItem<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        priority_order(self.key(), other.key())
    }
}

impl PartialOrd for RankedItem<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Rank `candidates` and return the best `k`.
///
/// Pure read. `k == 0` yields an empty board, `k` larger than the candidate
/// count yields every candidate.
pub fn rank<'a, I>(candidates: I, config: &PolicyConfig, k: usize) -> Vec<LeaderboardRow>
where
    I: IntoIterator<Item = &'a Candidate>,
{
    if k == 0 {
        return Vec::new();
    }

    let items = candidates.into_iter().map(|candidate| RankedItem {
        score: effective_score(candidate, config),
        candidate,
    });

    let mut heap: BinaryHeap<RankedItem<'a>> = BinaryHeap::new();
    for item in items {
        if heap.len() < k {
            heap.push(item);
        } else if let Some(worst) = heap.peek() {
            if item < *worst {
                heap.pop();
                heap.push(item);
            }
        }
    }

    // Ascending by Ord == best first
    heap.into_sorted_vec()
        .into_iter()
        .enumerate()
        .map(|(index, item)| LeaderboardRow {
            rank: index + 1,
            name: item.candidate.name().to_string(),
            score: item.score,
            expected_gain: item.candidate.expected_gain(),
            expected_runtime: item.candidate.expected_runtime(),
            overfit_risk: item.candidate.overfit_risk(),
            trials: item.candidate.trials(),
            success_count: item.candidate.success_count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn candidate(name: &str, gain: f64, sequence: u64) -> Candidate {
        Candidate {
            name: name.to_string(),
            config: Map::new(),
            expected_gain: gain,
            expected_runtime: 1.0,
            overfit_risk: 0.0,
            trials: 0,
            success_count: 0,
            sequence,
        }
    }

    fn names(rows: &[LeaderboardRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_rank_descending_basic() {
        let pool = [
            candidate("a", 1.0, 1),
            candidate("b", 5.0, 2),
            candidate("c", 3.0, 3),
            candidate("d", 9.0, 4),
            candidate("e", 2.0, 5),
        ];
        let rows = rank(&pool, &PolicyConfig::default(), 3);
        assert_eq!(names(&rows), vec!["d", "b", "c"]);
        assert_eq!(rows.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_k_greater_than_length() {
        let pool = [candidate("a", 3.0, 1), candidate("b", 1.0, 2), candidate("c", 2.0, 3)];
        let rows = rank(&pool, &PolicyConfig::default(), 10);
        assert_eq!(names(&rows), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_rank_k_zero_is_empty() {
        let pool = [candidate("a", 3.0, 1)];
        assert!(rank(&pool, &PolicyConfig::default(), 0).is_empty());
    }

    #[test]
    fn test_rank_ties_by_sequence() {
        let pool = [
            candidate("late", 2.0, 9),
            candidate("early", 2.0, 3),
            candidate("middle", 2.0, 5),
        ];
        let rows = rank(&pool, &PolicyConfig::default(), 2);
        assert_eq!(names(&rows), vec!["early", "middle"]);
    }

    #[test]
    fn test_rank_row_fields() {
        let pool = [candidate("a", 2.0, 1)];
        let rows = rank(&pool, &PolicyConfig::default(), 1);
        let row = &rows[0];
        // raw 2.0, blend 0.7 * 0.5 + 0.3 * 1.0
        assert!((row.score - 1.3).abs() < 1e-12);
        assert_eq!(row.expected_gain, 2.0);
        assert_eq!(row.trials, 0);
    }
}
