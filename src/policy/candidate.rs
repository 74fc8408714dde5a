//! Candidate - a named experiment with belief estimates and outcome counters

use serde::Serialize;
use serde_json::{Map, Value};

/// Gain estimate a candidate starts with when the builder is not told otherwise.
pub const DEFAULT_EXPECTED_GAIN: f64 = 0.005;
/// Runtime estimate a candidate starts with when the builder is not told otherwise.
pub const DEFAULT_EXPECTED_RUNTIME: f64 = 5.0;
/// Overfit risk a candidate starts with when the builder is not told otherwise.
pub const DEFAULT_OVERFIT_RISK: f64 = 0.2;

/// A candidate action ("hypothesis") owned by the policy engine.
///
/// All mutation goes through [`PolicyEngine`](crate::PolicyEngine); callers
/// only ever see clones or shared references of the live record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Candidate {
    pub(crate) name: String,
    pub(crate) config: Map<String, Value>,
    pub(crate) expected_gain: f64,
    pub(crate) expected_runtime: f64,
    pub(crate) overfit_risk: f64,
    pub(crate) trials: u64,
    pub(crate) success_count: u64,
    pub(crate) sequence: u64,
}

impl Candidate {
    /// Create a builder for a candidate with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CandidateSpec {
        CandidateSpec::new(name)
    }

    /// Get the candidate name (primary key).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the opaque configuration map.
    #[must_use]
    pub const fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Current payoff-per-run estimate.
    #[must_use]
    pub const fn expected_gain(&self) -> f64 {
        self.expected_gain
    }

    /// Current cost-per-run estimate (always positive).
    #[must_use]
    pub const fn expected_runtime(&self) -> f64 {
        self.expected_runtime
    }

    /// Current estimate that a result is unreliable.
    #[must_use]
    pub const fn overfit_risk(&self) -> f64 {
        self.overfit_risk
    }

    /// Number of recorded outcomes.
    #[must_use]
    pub const fn trials(&self) -> u64 {
        self.trials
    }

    /// Number of recorded outcomes with positive gain.
    #[must_use]
    pub const fn success_count(&self) -> u64 {
        self.success_count
    }

    /// Insertion sequence of the candidate's latest priority push.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Observed success frequency, 0 when untried.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.success_count as f64 / self.trials as f64
        }
    }
}

/// Registration request for a candidate.
///
/// ```rust
/// use prometheus_tepe::{Candidate, PolicyEngine};
///
/// let mut engine = PolicyEngine::new();
/// engine.register_candidate(
///     Candidate::builder("target_encoding")
///         .expected_gain(0.012)
///         .expected_runtime(6.0)
///         .overfit_risk(0.25)
///         .config_entry("smoothing", serde_json::json!(10)),
/// )?;
/// assert_eq!(engine.len(), 1);
/// # Ok::<(), prometheus_tepe::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CandidateSpec {
    pub(crate) name: String,
    pub(crate) config: Map<String, Value>,
    pub(crate) expected_gain: f64,
    pub(crate) expected_runtime: f64,
    pub(crate) overfit_risk: f64,
}

impl CandidateSpec {
    /// Create a spec with the default estimates.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Map::new(),
            expected_gain: DEFAULT_EXPECTED_GAIN,
            expected_runtime: DEFAULT_EXPECTED_RUNTIME,
            overfit_risk: DEFAULT_OVERFIT_RISK,
        }
    }

    /// Set the initial gain estimate.
    #[must_use]
    pub const fn expected_gain(mut self, gain: f64) -> Self {
        self.expected_gain = gain;
        self
    }

    /// Set the initial runtime estimate.
    #[must_use]
    pub const fn expected_runtime(mut self, runtime: f64) -> Self {
        self.expected_runtime = runtime;
        self
    }

    /// Set the initial overfit risk.
    #[must_use]
    pub const fn overfit_risk(mut self, risk: f64) -> Self {
        self.overfit_risk = risk;
        self
    }

    /// Replace the whole configuration map.
    #[must_use]
    pub fn config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    /// Add a single configuration entry.
    #[must_use]
    pub fn config_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}
