//! Shared engine handle for multiple workers
//!
//! Pops and outcome recordings both read-then-write the queue and the
//! candidate map, so every operation runs under one lock.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{Candidate, CandidateSpec, PolicyEngine};
use crate::leaderboard::LeaderboardRow;
use crate::Result;

/// Cloneable, thread-safe handle around a [`PolicyEngine`].
///
/// ```rust
/// use prometheus_tepe::{PolicyEngine, SharedPolicyEngine};
///
/// let shared = SharedPolicyEngine::new(PolicyEngine::new());
/// shared.register("h1", 0.02, 5.0, 0.1)?;
///
/// let worker = shared.clone();
/// let handle = std::thread::spawn(move || worker.claim_next().map(|c| c.name().to_string()));
/// assert_eq!(handle.join().unwrap().as_deref(), Some("h1"));
/// # Ok::<(), prometheus_tepe::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedPolicyEngine {
    inner: Arc<Mutex<PolicyEngine>>,
}

impl SharedPolicyEngine {
    /// Wrap an engine.
    #[must_use]
    pub fn new(engine: PolicyEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    // Every mutation completes before the guard drops, so a poisoned lock
    // still guards a consistent engine.
    fn lock(&self) -> MutexGuard<'_, PolicyEngine> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// See [`PolicyEngine::register`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `name` is empty
    pub fn register(
        &self,
        name: impl Into<String>,
        expected_gain: f64,
        expected_runtime: f64,
        overfit_risk: f64,
    ) -> Result<()> {
        self.lock()
            .register(name, expected_gain, expected_runtime, overfit_risk)
    }

    /// See [`PolicyEngine::register_candidate`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the name is empty
    pub fn register_candidate(&self, spec: CandidateSpec) -> Result<()> {
        self.lock().register_candidate(spec)
    }

    /// Pop the highest-priority candidate under the lock, so two workers
    /// never claim the same queue entry.
    #[must_use]
    pub fn claim_next(&self) -> Option<Candidate> {
        self.lock().pop_highest_priority()
    }

    /// See [`PolicyEngine::record_outcome`].
    ///
    /// # Errors
    ///
    /// Returns `UnknownCandidate` if `name` was never registered
    pub fn record_outcome(
        &self,
        name: &str,
        observed_gain: f64,
        observed_runtime: f64,
        overfit_flag: bool,
    ) -> Result<()> {
        self.lock()
            .record_outcome(name, observed_gain, observed_runtime, overfit_flag)
    }

    /// See [`PolicyEngine::requeue`].
    ///
    /// # Errors
    ///
    /// Returns `UnknownCandidate` if `name` was never registered
    pub fn requeue(&self, name: &str) -> Result<()> {
        self.lock().requeue(name)
    }

    /// See [`PolicyEngine::leaderboard`].
    #[must_use]
    pub fn leaderboard(&self, top_k: usize) -> Vec<LeaderboardRow> {
        self.lock().leaderboard(top_k)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut PolicyEngine) -> R) -> R {
        f(&mut self.lock())
    }
}
