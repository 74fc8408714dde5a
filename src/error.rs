//! Error types for the policy engine
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)
//!
//! An exhausted queue is not an error: `PolicyEngine::pop_highest_priority`
//! returns `None` and callers treat it as the end of a scheduling loop.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Policy engine error types
#[derive(Error, Debug)]
pub enum Error {
    /// Outcome reported for a name that was never registered
    #[error("Unknown candidate: {0}\nRegister it before recording outcomes")]
    UnknownCandidate(String),

    /// Policy configuration rejected by validation
    #[error("Invalid policy config: {0}")]
    InvalidConfig(String),

    /// Well-typed input that cannot be accepted (empty names, corrupt snapshots)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Snapshot or session (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_candidate_names_the_candidate() {
        let error = Error::UnknownCandidate("h9".to_string());
        let message = error.to_string();
        assert!(message.contains("Unknown candidate: h9"));
        assert!(message.contains("Register it"));
    }

    #[test]
    fn test_serialization_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let error: Error = parse.unwrap_err().into();
        assert!(matches!(error, Error::Serialization(_)));
    }
}
