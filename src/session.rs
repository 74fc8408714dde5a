//! Session state - what a caller keeps between scheduling invocations
//!
//! Holds the task description, the opaque dataset profile produced by an
//! external profiler, and the seed hypotheses the engine is built from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{Error, PolicyConfig, PolicyEngine, Result};

/// Initial estimates for one hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedHypothesis {
    /// Candidate name
    pub name: String,
    /// Expected gain per run
    pub gain: f64,
    /// Expected runtime per run, in minutes
    pub runtime: f64,
    /// Overfit risk
    pub risk: f64,
}

impl SeedHypothesis {
    /// Create a seed.
    #[must_use]
    pub fn new(name: impl Into<String>, gain: f64, runtime: f64, risk: f64) -> Self {
        Self {
            name: name.into(),
            gain,
            runtime,
            risk,
        }
    }
}

/// The starting portfolio: a gradient-boosting baseline plus two feature ideas.
#[must_use]
pub fn default_seeds() -> Vec<SeedHypothesis> {
    vec![
        SeedHypothesis::new("baseline_lightgbm", 0.01, 4.0, 0.15),
        SeedHypothesis::new("target_encoding", 0.012, 6.0, 0.25),
        SeedHypothesis::new("feature_interactions", 0.008, 5.0, 0.2),
    ]
}

/// Serializable session description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Dataset location
    pub dataset: String,
    /// Target column
    pub target: String,
    /// Evaluation metric
    pub metric: String,
    /// Time budget, in minutes
    pub budget_minutes: u32,
    /// Opaque dataset profile; never inspected here
    #[serde(default)]
    pub profile: Option<Value>,
    /// Seed hypotheses
    #[serde(default)]
    pub experiments: Vec<SeedHypothesis>,
}

impl SessionState {
    /// Create a session seeded with [`default_seeds`].
    #[must_use]
    pub fn new(
        dataset: impl Into<String>,
        target: impl Into<String>,
        metric: impl Into<String>,
        budget_minutes: u32,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            target: target.into(),
            metric: metric.into(),
            budget_minutes,
            profile: None,
            experiments: default_seeds(),
        }
    }

    /// Attach a dataset profile.
    #[must_use]
    pub fn with_profile(mut self, profile: Value) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Replace the seed hypotheses.
    #[must_use]
    pub fn with_experiments(mut self, experiments: Vec<SeedHypothesis>) -> Self {
        self.experiments = experiments;
        self
    }

    /// Build an engine with every seed registered, in seed order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if there are no seeds or a seed is unnamed, and
    /// `InvalidConfig` if `config` fails validation
    pub fn build_engine(&self, config: PolicyConfig) -> Result<PolicyEngine> {
        if self.experiments.is_empty() {
            return Err(Error::InvalidInput(
                "session has no experiments to schedule".to_string(),
            ));
        }

        let mut engine = PolicyEngine::with_config(config)?;
        for seed in &self.experiments {
            engine.register(seed.name.clone(), seed.gain, seed.runtime, seed.risk)?;
        }

        info!(
            dataset = %self.dataset,
            target = %self.target,
            metric = %self.metric,
            budget_minutes = self.budget_minutes,
            candidates = engine.len(),
            "built engine from session"
        );
        Ok(engine)
    }

    /// Serialize to pretty JSON.
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
}
