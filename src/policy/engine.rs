//! Policy engine - adaptive priority scheduling over candidates
//!
//! Owns every [`Candidate`] and a lazy [`PriorityQueue`](super::queue) of
//! hints. The candidate map is authoritative; a heap entry only counts while
//! its sequence matches the candidate's latest push.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::queue::PriorityQueue;
use super::scoring::{effective_score, sanitize_gain, sanitize_runtime, OBSERVED_RUNTIME_FLOOR};
use super::{Candidate, CandidateSpec};
use crate::leaderboard::{self, LeaderboardRow};
use crate::{Error, PolicyConfig, Result};

/// Time-aware experiment policy engine.
///
/// Single-threaded by design; wrap it in
/// [`SharedPolicyEngine`](super::SharedPolicyEngine) for multiple workers.
///
/// ```rust
/// use prometheus_tepe::PolicyEngine;
///
/// let mut engine = PolicyEngine::new();
/// engine.register("h1", 0.02, 5.0, 0.1)?;
/// engine.register("h2", 0.01, 2.0, 0.2)?;
///
/// let next = engine.pop_highest_priority().expect("two live candidates");
/// assert_eq!(next.name(), "h2");
///
/// engine.record_outcome(next.name(), 0.01, 3.0, false)?;
/// assert_eq!(engine.leaderboard(10).len(), 2);
/// # Ok::<(), prometheus_tepe::Error>(())
/// ```
#[derive(Debug)]
pub struct PolicyEngine {
    pub(crate) config: PolicyConfig,
    pub(crate) candidates: FxHashMap<String, Candidate>,
    queue: PriorityQueue,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyEngine {
    /// Create an engine with the default policy (Beta(1, 1) prior).
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PolicyConfig::default(),
            candidates: FxHashMap::default(),
            queue: PriorityQueue::new(),
        }
    }

    /// Create an engine with a custom policy. Priors are fixed from here on.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the config fails validation
    pub fn with_config(config: PolicyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Get the policy configuration.
    #[must_use]
    pub const fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Register (or replace) a candidate with an empty configuration.
    ///
    /// Use [`register_candidate`](Self::register_candidate) with
    /// [`Candidate::builder`] to attach a configuration map.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `name` is empty
    pub fn register(
        &mut self,
        name: impl Into<String>,
        expected_gain: f64,
        expected_runtime: f64,
        overfit_risk: f64,
    ) -> Result<()> {
        self.register_candidate(
            CandidateSpec::new(name)
                .expected_gain(expected_gain)
                .expected_runtime(expected_runtime)
                .overfit_risk(overfit_risk),
        )
    }

    /// Register (or replace) a candidate from a spec.
    ///
    /// Re-registering a name replaces the record and resets its counters;
    /// last write wins. Estimates are clamped rather than rejected: runtime
    /// is held inside `[RUNTIME_EPSILON, f64::MAX]`, risk inside the
    /// configured bounds, and a non-finite gain becomes 0.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the name is empty
    pub fn register_candidate(&mut self, spec: CandidateSpec) -> Result<()> {
        if spec.name.is_empty() {
            return Err(Error::InvalidInput(
                "candidate name must not be empty".to_string(),
            ));
        }

        let candidate = Candidate {
            expected_gain: sanitize_gain(spec.expected_gain),
            expected_runtime: sanitize_runtime(spec.expected_runtime),
            overfit_risk: self.config.clamp_risk(spec.overfit_risk),
            name: spec.name,
            config: spec.config,
            trials: 0,
            success_count: 0,
            sequence: 0,
        };

        let replaced = self.insert(candidate);
        debug!(replaced, candidates = self.candidates.len(), "registered candidate");
        Ok(())
    }

    /// Insert a fully formed candidate and queue it. Returns whether a
    /// candidate of the same name was replaced.
    pub(crate) fn insert(&mut self, candidate: Candidate) -> bool {
        let name = candidate.name.clone();
        let replaced = self.candidates.insert(name.clone(), candidate).is_some();
        self.push(&name);
        replaced
    }

    /// Return the live candidate with the highest effective score.
    ///
    /// The candidate stays registered but is no longer queued: it is only
    /// returned again after [`record_outcome`](Self::record_outcome),
    /// [`requeue`](Self::requeue) or re-registration. `None` means nothing
    /// is queued, which ends a scheduling loop normally.
    pub fn pop_highest_priority(&mut self) -> Option<Candidate> {
        let candidates = &self.candidates;
        let entry = self.queue.pop_live(|entry| {
            candidates
                .get(&entry.name)
                .is_some_and(|candidate| candidate.sequence == entry.sequence)
        })?;

        let candidate = self.candidates.get(&entry.name)?;
        debug!(name = %candidate.name, score = entry.score, "popped candidate");
        Some(candidate.clone())
    }

    /// Record an observed outcome and re-queue the candidate.
    ///
    /// A non-finite observed gain counts as 0. A non-finite observed runtime
    /// leaves the runtime estimate where it was.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCandidate` if `name` was never registered; the engine
    /// is left untouched.
    pub fn record_outcome(
        &mut self,
        name: &str,
        observed_gain: f64,
        observed_runtime: f64,
        overfit_flag: bool,
    ) -> Result<()> {
        let config = self.config;
        let Some(candidate) = self.candidates.get_mut(name) else {
            warn!(name, "outcome reported for unknown candidate");
            return Err(Error::UnknownCandidate(name.to_string()));
        };

        let observed_gain = sanitize_gain(observed_gain);
        let observed_runtime = if observed_runtime.is_finite() {
            observed_runtime.max(OBSERVED_RUNTIME_FLOOR)
        } else {
            candidate.expected_runtime
        };

        candidate.trials += 1;
        let success = observed_gain > 0.0;
        if success {
            candidate.success_count += 1;
        }

        // Exponential moving averages
        let lr = config.learning_rate;
        candidate.expected_gain = sanitize_gain(
            (1.0 - lr) * candidate.expected_gain + lr * observed_gain.max(0.0),
        );
        candidate.expected_runtime =
            sanitize_runtime((1.0 - lr) * candidate.expected_runtime + lr * observed_runtime);

        let risk = if overfit_flag {
            candidate.overfit_risk + config.overfit_penalty
        } else if success {
            candidate.overfit_risk - config.success_relief
        } else {
            candidate.overfit_risk + config.failure_penalty
        };
        candidate.overfit_risk = config.clamp_risk(risk);

        info!(
            name,
            trials = candidate.trials,
            successes = candidate.success_count,
            expected_gain = candidate.expected_gain,
            expected_runtime = candidate.expected_runtime,
            overfit_risk = candidate.overfit_risk,
            "recorded outcome"
        );

        self.push(name);
        Ok(())
    }

    /// Queue a registered candidate again without recording an outcome.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCandidate` if `name` was never registered
    pub fn requeue(&mut self, name: &str) -> Result<()> {
        if !self.candidates.contains_key(name) {
            warn!(name, "requeue requested for unknown candidate");
            return Err(Error::UnknownCandidate(name.to_string()));
        }
        self.push(name);
        debug!(name, "requeued candidate");
        Ok(())
    }

    /// Ranked view of the best `top_k` candidates. Pure read.
    #[must_use]
    pub fn leaderboard(&self, top_k: usize) -> Vec<LeaderboardRow> {
        leaderboard::rank(self.candidates.values(), &self.config, top_k)
    }

    /// Leaderboard of the configured default length.
    #[must_use]
    pub fn leaderboard_default(&self) -> Vec<LeaderboardRow> {
        self.leaderboard(self.config.leaderboard_size)
    }

    /// Get a candidate by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Candidate> {
        self.candidates.get(name)
    }

    /// Check whether a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.candidates.contains_key(name)
    }

    /// Current effective score of a candidate.
    #[must_use]
    pub fn effective_score_of(&self, name: &str) -> Option<f64> {
        self.candidates
            .get(name)
            .map(|candidate| effective_score(candidate, &self.config))
    }

    /// Number of registered candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Check if no candidate is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of candidates that a pop could currently return.
    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queue
            .iter()
            .filter(|entry| self.is_current(&entry.name, entry.sequence))
            .count()
    }

    /// Iterate over all registered candidates in no particular order.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.values()
    }

    /// Configuration map of a candidate, if registered.
    #[must_use]
    pub fn candidate_config(&self, name: &str) -> Option<&Map<String, Value>> {
        self.candidates.get(name).map(Candidate::config)
    }

    fn is_current(&self, name: &str, sequence: u64) -> bool {
        self.candidates
            .get(name)
            .is_some_and(|candidate| candidate.sequence == sequence)
    }

    fn push(&mut self, name: &str) {
        let Some(candidate) = self.candidates.get_mut(name) else {
            return;
        };
        let score = effective_score(candidate, &self.config);
        candidate.sequence = self.queue.push(name, score);

        let candidates = &self.candidates;
        let removed = self.queue.compact_if_needed(candidates.len(), |entry| {
            candidates
                .get(&entry.name)
                .is_some_and(|candidate| candidate.sequence == entry.sequence)
        });
        if removed > 0 {
            debug!(removed, remaining = self.queue.len(), "compacted priority queue");
        }
    }
}
