//! Outcome history - time-series of recorded outcomes
//!
//! The engine itself keeps only running estimates. A scheduling loop that
//! wants the raw observations appends them here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed outcome of one candidate run.
///
/// ## Time-Series Layout
///
/// - `candidate` as the partition key
/// - `step` as the sort key
/// - `recorded_at` for wall-clock correlation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutcomeRecord {
    candidate: String,
    step: u64,
    observed_gain: f64,
    observed_runtime: f64,
    overfit_flag: bool,
    recorded_at: DateTime<Utc>,
}

impl OutcomeRecord {
    /// Create a record stamped with the current time.
    ///
    /// # Arguments
    ///
    /// * `candidate` - Name of the candidate that ran
    /// * `step` - Scheduling step (0-based)
    /// * `observed_gain` - Gain the run produced
    /// * `observed_runtime` - Time the run took
    /// * `overfit_flag` - Whether the result was flagged unreliable
    #[must_use]
    pub fn new(
        candidate: impl Into<String>,
        step: u64,
        observed_gain: f64,
        observed_runtime: f64,
        overfit_flag: bool,
    ) -> Self {
        Self {
            candidate: candidate.into(),
            step,
            observed_gain,
            observed_runtime,
            overfit_flag,
            recorded_at: Utc::now(),
        }
    }

    /// Override the timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }

    /// Get the candidate name.
    #[must_use]
    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    /// Get the scheduling step.
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Get the observed gain.
    #[must_use]
    pub const fn observed_gain(&self) -> f64 {
        self.observed_gain
    }

    /// Get the observed runtime.
    #[must_use]
    pub const fn observed_runtime(&self) -> f64 {
        self.observed_runtime
    }

    /// Whether the run was flagged as overfit.
    #[must_use]
    pub const fn overfit_flag(&self) -> bool {
        self.overfit_flag
    }

    /// Get the timestamp.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Same success rule the engine uses: positive gain.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.observed_gain > 0.0
    }
}

/// Append-only log of outcomes.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OutcomeHistory {
    records: Vec<OutcomeRecord>,
}

impl OutcomeHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: OutcomeRecord) {
        self.records.push(record);
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    /// Records of one candidate, ordered by step.
    #[must_use]
    pub fn for_candidate(&self, candidate: &str) -> Vec<&OutcomeRecord> {
        let mut records: Vec<&OutcomeRecord> = self
            .records
            .iter()
            .filter(|r| r.candidate() == candidate)
            .collect();
        records.sort_by_key(|r| r.step());
        records
    }

    /// Total observed runtime across all records.
    #[must_use]
    pub fn total_runtime(&self) -> f64 {
        self.records.iter().map(OutcomeRecord::observed_runtime).sum()
    }

    /// Record with the highest observed gain, if any.
    #[must_use]
    pub fn best(&self) -> Option<&OutcomeRecord> {
        self.records
            .iter()
            .max_by(|a, b| a.observed_gain().total_cmp(&b.observed_gain()))
    }
}
