//! Policy configuration
//!
//! Every tunable of the scoring and update rules lives here. The defaults
//! are the standard TEPE policy: Beta(1, 1) prior, 0.35 learning rate,
//! 70/30 exploitation/exploration blend, risk bounded to `[0.01, 0.99]`.
//!
//! ```rust
//! use prometheus_tepe::PolicyConfig;
//!
//! let config = PolicyConfig::builder()
//!     .alpha_prior(2.0)
//!     .beta_prior(5.0)
//!     .build()?;
//! assert_eq!(config.alpha_prior, 2.0);
//! assert_eq!(config.learning_rate, 0.35);
//! # Ok::<(), prometheus_tepe::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tunables for scoring and adaptive updates.
///
/// Fields are public for reading; construct through [`PolicyConfig::builder`]
/// or [`PolicyConfig::from_json`] so values are validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Beta prior pseudo-successes
    pub alpha_prior: f64,
    /// Beta prior pseudo-failures
    pub beta_prior: f64,
    /// EMA learning rate for gain and runtime estimates
    pub learning_rate: f64,
    /// Weight of the posterior mean in the blend; exploration gets the rest
    pub exploitation_weight: f64,
    /// Risk added when a run is flagged as overfit
    pub overfit_penalty: f64,
    /// Risk removed after an unflagged success
    pub success_relief: f64,
    /// Risk added after an unflagged failure
    pub failure_penalty: f64,
    /// Lower risk bound
    pub min_risk: f64,
    /// Upper risk bound
    pub max_risk: f64,
    /// Default leaderboard length
    pub leaderboard_size: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            alpha_prior: 1.0,
            beta_prior: 1.0,
            learning_rate: 0.35,
            exploitation_weight: 0.7,
            overfit_penalty: 0.10,
            success_relief: 0.03,
            failure_penalty: 0.02,
            min_risk: 0.01,
            max_risk: 0.99,
            leaderboard_size: 10,
        }
    }
}

impl PolicyConfig {
    /// Create a config builder starting from the defaults
    #[must_use]
    pub fn builder() -> PolicyConfigBuilder {
        PolicyConfigBuilder::default()
    }

    /// Weight of the exploration bonus in the blend
    #[must_use]
    pub fn exploration_weight(&self) -> f64 {
        1.0 - self.exploitation_weight
    }

    /// Clamp a risk value into `[min_risk, max_risk]`.
    ///
    /// NaN maps to the upper bound so an unreadable risk is never rewarded.
    #[must_use]
    pub fn clamp_risk(&self, risk: f64) -> f64 {
        if risk.is_nan() {
            return self.max_risk;
        }
        risk.clamp(self.min_risk, self.max_risk)
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON and `InvalidConfig` when a
    /// value fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its admissible range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha_prior.is_finite() && self.alpha_prior > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "alpha_prior must be positive, got {}",
                self.alpha_prior
            )));
        }
        if !(self.beta_prior.is_finite() && self.beta_prior > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "beta_prior must be positive, got {}",
                self.beta_prior
            )));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.exploitation_weight) {
            return Err(Error::InvalidConfig(format!(
                "exploitation_weight must be in [0, 1], got {}",
                self.exploitation_weight
            )));
        }
        for (field, value) in [
            ("overfit_penalty", self.overfit_penalty),
            ("success_relief", self.success_relief),
            ("failure_penalty", self.failure_penalty),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{field} must be non-negative, got {value}"
                )));
            }
        }
        if !(self.min_risk > 0.0 && self.min_risk <= self.max_risk && self.max_risk < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "risk bounds must satisfy 0 < min_risk <= max_risk < 1, got [{}, {}]",
                self.min_risk, self.max_risk
            )));
        }
        Ok(())
    }
}

/// Builder for [`PolicyConfig`]
#[derive(Debug, Default)]
pub struct PolicyConfigBuilder {
    config: PolicyConfig,
}

impl PolicyConfigBuilder {
    /// Set the Beta prior pseudo-successes
    #[must_use]
    pub fn alpha_prior(mut self, alpha: f64) -> Self {
        self.config.alpha_prior = alpha;
        self
    }

    /// Set the Beta prior pseudo-failures
    #[must_use]
    pub fn beta_prior(mut self, beta: f64) -> Self {
        self.config.beta_prior = beta;
        self
    }

    /// Set the EMA learning rate
    #[must_use]
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.config.learning_rate = rate;
        self
    }

    /// Set the exploitation weight of the score blend
    #[must_use]
    pub fn exploitation_weight(mut self, weight: f64) -> Self {
        self.config.exploitation_weight = weight;
        self
    }

    /// Set the risk adjustments applied by outcome recording
    #[must_use]
    pub fn risk_adjustments(mut self, overfit: f64, relief: f64, failure: f64) -> Self {
        self.config.overfit_penalty = overfit;
        self.config.success_relief = relief;
        self.config.failure_penalty = failure;
        self
    }

    /// Set the risk bounds
    #[must_use]
    pub fn risk_bounds(mut self, min: f64, max: f64) -> Self {
        self.config.min_risk = min;
        self.config.max_risk = max;
        self
    }

    /// Set the default leaderboard length
    #[must_use]
    pub fn leaderboard_size(mut self, size: usize) -> Self {
        self.config.leaderboard_size = size;
        self
    }

    /// Build the config
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if validation fails
    pub fn build(self) -> Result<PolicyConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_standard_policy() {
        let config = PolicyConfig::default();
        assert_eq!(config.alpha_prior, 1.0);
        assert_eq!(config.beta_prior, 1.0);
        assert_eq!(config.learning_rate, 0.35);
        assert!((config.exploration_weight() - 0.3).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_non_positive_prior() {
        let result = PolicyConfig::builder().alpha_prior(0.0).build();
        assert!(result.unwrap_err().to_string().contains("alpha_prior"));
    }

    #[test]
    fn test_builder_rejects_inverted_risk_bounds() {
        let result = PolicyConfig::builder().risk_bounds(0.5, 0.2).build();
        assert!(result.unwrap_err().to_string().contains("risk bounds"));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = PolicyConfig::from_json(r#"{"alpha_prior": 3.0}"#).unwrap();
        assert_eq!(config.alpha_prior, 3.0);
        assert_eq!(config.beta_prior, 1.0);
        assert_eq!(config.leaderboard_size, 10);
    }

    #[test]
    fn test_from_json_validates() {
        let result = PolicyConfig::from_json(r#"{"learning_rate": 1.5}"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_clamp_risk() {
        let config = PolicyConfig::default();
        assert_eq!(config.clamp_risk(-1.0), 0.01);
        assert_eq!(config.clamp_risk(2.0), 0.99);
        assert_eq!(config.clamp_risk(f64::NAN), 0.99);
        assert_eq!(config.clamp_risk(0.4), 0.4);
    }
}
