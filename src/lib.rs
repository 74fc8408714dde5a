//! # Prometheus TEPE: Time-Aware Experiment Policy Engine
//!
//! **Version**: 0.1.0
//!
//! TEPE decides which candidate experiment ("hypothesis") to run next from
//! uncertain, evolving estimates of each candidate's payoff, cost and overfit
//! risk, re-prioritizing as outcomes arrive.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Muda elimination**: Lazy re-scoring; only the changed candidate is re-pushed
//! - **Poka-Yoke safety**: Estimates are clamped, never rejected
//! - **Genchi Genbutsu**: Every outcome updates beliefs (Beta posterior + EMA)
//! - **Jidoka**: Leaderboard order is exactly pop order
//!
//! ## Example Usage
//!
//! ```rust
//! use prometheus_tepe::PolicyEngine;
//!
//! let mut engine = PolicyEngine::new();
//! engine.register("baseline_lightgbm", 0.01, 4.0, 0.15)?;
//! engine.register("target_encoding", 0.012, 6.0, 0.25)?;
//!
//! while let Some(next) = engine.pop_highest_priority() {
//!     // run `next` externally, then report what happened
//!     engine.record_outcome(next.name(), 0.008, 4.5, false)?;
//!     if engine.candidates().map(|c| c.trials()).sum::<u64>() >= 4 {
//!         break;
//!     }
//! }
//!
//! for row in engine.leaderboard(10) {
//!     println!("{:>2} {:<20} {:.5}", row.rank, row.name, row.score);
//! }
//! # Ok::<(), prometheus_tepe::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod driver;
pub mod error;
pub mod history;
pub mod leaderboard;
pub mod policy;
pub mod session;
pub mod snapshot;

pub use config::{PolicyConfig, PolicyConfigBuilder};
pub use error::{Error, Result};
pub use leaderboard::LeaderboardRow;
pub use policy::{Candidate, CandidateSpec, PolicyEngine, SharedPolicyEngine};
