//! Scoring function
//!
//! ```text
//! raw        = expected_gain / max(expected_runtime, ε) * clamp(1 - overfit_risk, 0, 1)
//! posterior  = (α + successes) / (α + β + trials)
//! bonus      = 1 / (1 + trials)
//! effective  = raw * (w * posterior + (1 - w) * bonus)           w = 0.7 by default
//! ```
//!
//! Scores are always recomputed from the live candidate; nothing here caches.

use std::cmp::Ordering;

use super::Candidate;
use crate::PolicyConfig;

/// Runtime floor used by the payoff-per-cost ratio.
pub const RUNTIME_EPSILON: f64 = 1e-6;

/// Floor applied to observed runtimes before they enter the runtime EMA.
pub const OBSERVED_RUNTIME_FLOOR: f64 = 1e-3;

/// Gain estimate with non-finite values replaced by 0.
#[must_use]
pub(crate) fn sanitize_gain(gain: f64) -> f64 {
    if gain.is_finite() {
        gain
    } else {
        0.0
    }
}

/// Runtime estimate held inside `[RUNTIME_EPSILON, f64::MAX]`. NaN floors.
#[must_use]
pub(crate) fn sanitize_runtime(runtime: f64) -> f64 {
    if runtime.is_nan() {
        RUNTIME_EPSILON
    } else {
        runtime.clamp(RUNTIME_EPSILON, f64::MAX)
    }
}

/// Payoff per unit cost, scaled down by estimated unreliability.
#[must_use]
pub fn raw_score(candidate: &Candidate) -> f64 {
    let runtime = candidate.expected_runtime.max(RUNTIME_EPSILON);
    let reliability = (1.0 - candidate.overfit_risk).clamp(0.0, 1.0);
    (candidate.expected_gain / runtime) * reliability
}

/// Beta-Bernoulli posterior mean of the success probability.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn posterior_mean(candidate: &Candidate, config: &PolicyConfig) -> f64 {
    let successes = config.alpha_prior + candidate.success_count as f64;
    let total = config.alpha_prior + config.beta_prior + candidate.trials as f64;
    successes / total
}

/// Bonus for under-explored candidates, strictly decreasing in trials.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn exploration_bonus(candidate: &Candidate) -> f64 {
    1.0 / (1.0 + candidate.trials as f64)
}

/// The single score used for ordering.
#[must_use]
pub fn effective_score(candidate: &Candidate, config: &PolicyConfig) -> f64 {
    let blend = config.exploitation_weight * posterior_mean(candidate, config)
        + config.exploration_weight() * exploration_bonus(candidate);
    raw_score(candidate) * blend
}

/// Map a score onto a totally ordered key. Any non-finite score ranks last.
#[must_use]
pub(crate) fn rank_key(score: f64) -> f64 {
    if score.is_finite() {
        score
    } else {
        f64::NEG_INFINITY
    }
}

/// Ordering shared by the priority queue and the leaderboard:
/// higher score first, then smaller sequence first.
pub(crate) fn priority_order(a: (f64, u64), b: (f64, u64)) -> Ordering {
    rank_key(b.0)
        .total_cmp(&rank_key(a.0))
        .then_with(|| a.1.cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn candidate(gain: f64, runtime: f64, risk: f64, trials: u64, successes: u64) -> Candidate {
        Candidate {
            name: "c".to_string(),
            config: Map::new(),
            expected_gain: gain,
            expected_runtime: runtime,
            overfit_risk: risk,
            trials,
            success_count: successes,
            sequence: 0,
        }
    }

    #[test]
    fn test_raw_score_matches_hand_computation() {
        assert!((raw_score(&candidate(0.02, 5.0, 0.1, 0, 0)) - 0.0036).abs() < 1e-12);
        assert!((raw_score(&candidate(0.01, 2.0, 0.2, 0, 0)) - 0.004).abs() < 1e-12);
    }

    #[test]
    fn test_raw_score_floors_runtime() {
        let score = raw_score(&candidate(1.0, 0.0, 0.0, 0, 0));
        assert!((score - 1.0 / RUNTIME_EPSILON).abs() < 1e-3);
    }

    #[test]
    fn test_posterior_with_uniform_prior() {
        let config = PolicyConfig::default();
        assert!((posterior_mean(&candidate(0.0, 1.0, 0.0, 0, 0), &config) - 0.5).abs() < 1e-12);
        // (1 + 3) / (2 + 4)
        let tried = candidate(0.0, 1.0, 0.0, 4, 3);
        assert!((posterior_mean(&tried, &config) - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_exploration_bonus_decreases() {
        let bonuses: Vec<f64> = (0..5)
            .map(|t| exploration_bonus(&candidate(0.0, 1.0, 0.0, t, 0)))
            .collect();
        assert_eq!(bonuses[0], 1.0);
        assert!(bonuses.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_effective_score_untried_blend() {
        // posterior 0.5, bonus 1.0 -> blend 0.35 + 0.3 = 0.65
        let config = PolicyConfig::default();
        let c = candidate(0.01, 2.0, 0.2, 0, 0);
        assert!((effective_score(&c, &config) - 0.004 * 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_priority_order_ties_by_sequence() {
        assert_eq!(priority_order((1.0, 3), (1.0, 7)), Ordering::Less);
        assert_eq!(priority_order((2.0, 9), (1.0, 1)), Ordering::Less);
        assert_eq!(priority_order((f64::NAN, 1), (-5.0, 2)), Ordering::Greater);
    }

    #[test]
    fn test_infinite_scores_rank_last() {
        assert_eq!(priority_order((f64::INFINITY, 1), (0.0, 2)), Ordering::Greater);
        assert_eq!(priority_order((f64::NEG_INFINITY, 1), (-1e300, 2)), Ordering::Greater);
        // All non-finite keys tie, so sequence decides
        assert_eq!(priority_order((f64::INFINITY, 1), (f64::NAN, 2)), Ordering::Less);
    }

    #[test]
    fn test_sanitize_non_finite_estimates() {
        assert_eq!(sanitize_gain(f64::INFINITY), 0.0);
        assert_eq!(sanitize_gain(f64::NEG_INFINITY), 0.0);
        assert_eq!(sanitize_gain(f64::NAN), 0.0);
        assert_eq!(sanitize_gain(-0.25), -0.25);
        assert_eq!(sanitize_runtime(f64::NAN), RUNTIME_EPSILON);
        assert_eq!(sanitize_runtime(-3.0), RUNTIME_EPSILON);
        assert_eq!(sanitize_runtime(f64::INFINITY), f64::MAX);
        assert_eq!(sanitize_runtime(4.0), 4.0);
    }
}
