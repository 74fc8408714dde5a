//! Engine snapshots for the persistence collaborator
//!
//! A snapshot carries the field values of every candidate (estimates and
//! counters) plus the policy config. Restoring re-registers each candidate
//! and replays its counters; no outcome history is re-derived.
//!
//! ```rust
//! use prometheus_tepe::snapshot::{MemorySnapshotStore, SnapshotStore};
//! use prometheus_tepe::PolicyEngine;
//!
//! let mut engine = PolicyEngine::new();
//! engine.register("baseline", 0.01, 4.0, 0.15)?;
//! engine.record_outcome("baseline", 0.02, 4.2, false)?;
//!
//! let store = MemorySnapshotStore::new();
//! store.save("session", &engine.snapshot())?;
//!
//! let restored = PolicyEngine::restore(store.load("session")?.expect("saved above"))?;
//! assert_eq!(restored.get("baseline").map(|c| c.trials()), Some(1));
//! # Ok::<(), prometheus_tepe::Error>(())
//! ```

mod memory;

pub use memory::MemorySnapshotStore;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::policy::scoring::{sanitize_gain, sanitize_runtime};
use crate::policy::{Candidate, PolicyEngine};
use crate::{Error, PolicyConfig, Result};

/// Snapshot schema version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted field values of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateState {
    /// Candidate name
    pub name: String,
    /// Opaque configuration
    #[serde(default)]
    pub config: Map<String, Value>,
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

impl From<&Candidate> for CandidateState {
    fn from(candidate: &Candidate) -> Self {
        Self {
            name: candidate.name().to_string(),
            config: candidate.config().clone(),
            expected_gain: candidate.expected_gain(),
            expected_runtime: candidate.expected_runtime(),
            overfit_risk: candidate.overfit_risk(),
            trials: candidate.trials(),
            success_count: candidate.success_count(),
        }
    }
}

/// Full engine state at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Schema version
    pub version: u32,
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
    /// Policy the engine ran with
    pub config: PolicyConfig,
    /// Candidates in queue sequence order
    pub candidates: Vec<CandidateState>,
}

impl EngineSnapshot {
    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn validate(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(Error::InvalidInput(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                self.version
            )));
        }
        self.config.validate()?;

        let mut seen = FxHashSet::default();
        for state in &self.candidates {
            if state.name.is_empty() {
                return Err(Error::InvalidInput(
                    "snapshot contains a candidate without a name".to_string(),
                ));
            }
            if !seen.insert(state.name.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "snapshot repeats candidate {}",
                    state.name
                )));
            }
            if state.success_count > state.trials {
                return Err(Error::InvalidInput(format!(
                    "candidate {} has {} successes in {} trials",
                    state.name, state.success_count, state.trials
                )));
            }
        }
        Ok(())
    }
}

impl PolicyEngine {
    /// Capture every candidate's field values.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut candidates: Vec<&Candidate> = self.candidates.values().collect();
        candidates.sort_by_key(|candidate| candidate.sequence());

        EngineSnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            config: self.config,
            candidates: candidates.into_iter().map(CandidateState::from).collect(),
        }
    }

    /// Rebuild an engine from a snapshot.
    ///
    /// Candidates are re-registered in snapshot order, so ties resolve the
    /// same way they did before. Every restored candidate is queued, including
    /// one that was popped and not yet requeued when the snapshot was taken.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unsupported version, a repeated or empty
    /// name, or `success_count > trials`; `InvalidConfig` for a bad policy.
    pub fn restore(snapshot: EngineSnapshot) -> Result<Self> {
        snapshot.validate()?;
        let mut engine = Self::with_config(snapshot.config)?;

        for state in snapshot.candidates {
            let candidate = Candidate {
                expected_gain: sanitize_gain(state.expected_gain),
                expected_runtime: sanitize_runtime(state.expected_runtime),
                overfit_risk: engine.config.clamp_risk(state.overfit_risk),
                name: state.name,
                config: state.config,
                trials: state.trials,
                success_count: state.success_count,
                sequence: 0,
            };
            engine.insert(candidate);
        }

        debug!(candidates = engine.len(), "restored engine from snapshot");
        Ok(engine)
    }
}

/// Storage seam for snapshots. Durable backends live outside this crate.
pub trait SnapshotStore: Send + Sync {
    /// Store a snapshot under `key`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be encoded or written
    fn save(&self, key: &str, snapshot: &EngineSnapshot) -> Result<()>;

    /// Load the snapshot stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored bytes cannot be decoded
    fn load(&self, key: &str) -> Result<Option<EngineSnapshot>>;

    /// Delete the snapshot under `key`. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails
    fn delete(&self, key: &str) -> Result<()>;

    /// List stored keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails
    fn keys(&self) -> Result<Vec<String>>;
}
