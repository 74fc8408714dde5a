//! Scheduling loop
//!
//! Pop the best candidate, run it through an [`OutcomeSource`], record the
//! observation, repeat. An empty queue ends the loop early without error.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::history::{OutcomeHistory, OutcomeRecord};
use crate::policy::{Candidate, PolicyEngine};
use crate::Result;

/// What running a candidate produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observed gain
    pub gain: f64,
    /// Observed runtime
    pub runtime: f64,
    /// Result flagged unreliable
    pub overfit_flag: bool,
}

/// Executes candidates on behalf of the loop.
pub trait OutcomeSource {
    /// Run `candidate` at `step` of `steps` and report what happened.
    ///
    /// # Errors
    ///
    /// Implementations return an error when the run itself fails; the loop
    /// stops and propagates it.
    fn observe(&mut self, step: usize, steps: usize, candidate: &Candidate) -> Result<Observation>;
}

/// Projects outcomes from the candidate's own estimates: gain ramps from
/// 70% toward 90% of the estimate over the loop, runtime overshoots by 5%.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectedOutcomes;

impl OutcomeSource for ProjectedOutcomes {
    #[allow(clippy::cast_precision_loss)]
    fn observe(&mut self, step: usize, steps: usize, candidate: &Candidate) -> Result<Observation> {
        let progress = (step + 1) as f64 / steps.max(1) as f64;
        Ok(Observation {
            gain: candidate.expected_gain() * 0.2f64.mul_add(progress, 0.7),
            runtime: candidate.expected_runtime() * 1.05,
            overfit_flag: false,
        })
    }
}

impl<F> OutcomeSource for F
where
    F: FnMut(usize, usize, &Candidate) -> Result<Observation>,
{
    fn observe(&mut self, step: usize, steps: usize, candidate: &Candidate) -> Result<Observation> {
        self(step, steps, candidate)
    }
}

/// Per-step summary of a loop run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// 0-based step
    pub step: usize,
    /// Candidate that ran
    pub name: String,
    /// What it produced
    pub observation: Observation,
    /// Its effective score after the update
    pub score_after: f64,
}

/// Drives a [`PolicyEngine`] and keeps the outcome history.
#[derive(Debug, Default)]
pub struct PolicyLoop {
    history: OutcomeHistory,
    steps_run: u64,
}

impl PolicyLoop {
    /// Create a loop with empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run up to `steps` pop/observe/record iterations.
    ///
    /// # Errors
    ///
    /// Propagates errors from the outcome source and from outcome recording
    pub fn run<S>(
        &mut self,
        engine: &mut PolicyEngine,
        steps: usize,
        source: &mut S,
    ) -> Result<Vec<StepReport>>
    where
        S: OutcomeSource + ?Sized,
    {
        let mut reports = Vec::with_capacity(steps);

        for step in 0..steps {
            let Some(candidate) = engine.pop_highest_priority() else {
                debug!(step, "queue exhausted");
                break;
            };

            let observation = source.observe(step, steps, &candidate)?;
            engine.record_outcome(
                candidate.name(),
                observation.gain,
                observation.runtime,
                observation.overfit_flag,
            )?;

            self.history.push(OutcomeRecord::new(
                candidate.name(),
                self.steps_run,
                observation.gain,
                observation.runtime,
                observation.overfit_flag,
            ));
            self.steps_run += 1;

            let score_after = engine
                .effective_score_of(candidate.name())
                .unwrap_or(f64::NEG_INFINITY);
            info!(
                step = step + 1,
                name = candidate.name(),
                gain = observation.gain,
                runtime = observation.runtime,
                "ran candidate"
            );

            reports.push(StepReport {
                step,
                name: candidate.name().to_string(),
                observation,
                score_after,
            });
        }

        Ok(reports)
    }

    /// Outcomes recorded so far, across every `run` call.
    #[must_use]
    pub const fn history(&self) -> &OutcomeHistory {
        &self.history
    }

    /// Consume the loop and keep the history.
    #[must_use]
    pub fn into_history(self) -> OutcomeHistory {
        self.history
    }
}
