//! Experiment Policy Engine (TEPE)
//!
//! Decides which candidate experiment to run next from uncertain, evolving
//! estimates of payoff, cost and overfit risk.
//!
//! ## Data Flow
//!
//! ```text
//! register ──> PolicyEngine ──> pop_highest_priority ──> (caller runs it)
//!                  ▲                                            │
//!                  └──────────── record_outcome <───────────────┘
//! ```
//!
//! Each registration and each recorded outcome pushes a fresh priority entry;
//! superseded entries are skipped lazily on pop.

mod candidate;
mod engine;
mod queue;
pub mod scoring;
mod shared;

pub use candidate::{
    Candidate, CandidateSpec, DEFAULT_EXPECTED_GAIN, DEFAULT_EXPECTED_RUNTIME,
    DEFAULT_OVERFIT_RISK,
};
pub use engine::PolicyEngine;
pub use shared::SharedPolicyEngine;
