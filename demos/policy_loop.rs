//! Policy Loop Example
//!
//! Seeds a session with the default hypotheses, runs a few noisy scheduling
//! steps, snapshots the engine and prints the leaderboard.
//!
//! Run with: RUST_LOG=prometheus_tepe=debug cargo run --example policy_loop

use prometheus_tepe::driver::{Observation, PolicyLoop};
use prometheus_tepe::session::SessionState;
use prometheus_tepe::snapshot::{MemorySnapshotStore, SnapshotStore};
use prometheus_tepe::{Candidate, PolicyConfig, PolicyEngine, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("prometheus_tepe=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Prometheus TEPE Policy Loop ===\n");

    // -------------------------------------------------------------------------
    // 1. Seed a session
    // -------------------------------------------------------------------------
    let session = SessionState::new("data/titanic.csv", "Survived", "auc", 60)
        .with_profile(serde_json::json!({"n_rows": 891, "n_cols": 12}));
    let mut engine = session.build_engine(PolicyConfig::default())?;
    println!("1. Seeded {} hypotheses for {}", engine.len(), session.dataset);

    // -------------------------------------------------------------------------
    // 2. Run the loop with noisy outcomes
    // -------------------------------------------------------------------------
    let mut rng = StdRng::seed_from_u64(2024);
    let mut noisy = |_: usize, _: usize, candidate: &Candidate| -> Result<Observation> {
        Ok(Observation {
            gain: candidate.expected_gain() * rng.gen_range(0.2..1.6),
            runtime: candidate.expected_runtime() * rng.gen_range(0.9..1.3),
            overfit_flag: rng.gen_bool(0.1),
        })
    };

    let mut policy_loop = PolicyLoop::new();
    println!("\n2. Running 8 steps...");
    for report in policy_loop.run(&mut engine, 8, &mut noisy)? {
        println!(
            "   Step {}: ran {:<22} gain={:.4} runtime={:.2}m score={:.6}",
            report.step + 1,
            report.name,
            report.observation.gain,
            report.observation.runtime,
            report.score_after
        );
    }

    // -------------------------------------------------------------------------
    // 3. Snapshot and restore
    // -------------------------------------------------------------------------
    let store = MemorySnapshotStore::new();
    store.save("titanic", &engine.snapshot())?;
    let restored = match store.load("titanic")? {
        Some(snapshot) => PolicyEngine::restore(snapshot)?,
        None => anyhow::bail!("snapshot vanished"),
    };
    println!("\n3. Restored {} candidates from snapshot", restored.len());

    // -------------------------------------------------------------------------
    // 4. Leaderboard
    // -------------------------------------------------------------------------
    println!("\n4. Leaderboard");
    println!(
        "   {:<4} {:<22} {:>9} {:>7} {:>8} {:>5} {:>6}",
        "#", "Experiment", "Score", "Gain", "Runtime", "Risk", "Trials"
    );
    for row in restored.leaderboard_default() {
        println!(
            "   {:<4} {:<22} {:>9.5} {:>7.4} {:>8.2} {:>5.2} {:>6}",
            row.rank,
            row.name,
            row.score,
            row.expected_gain,
            row.expected_runtime,
            row.overfit_risk,
            row.trials
        );
    }

    let history = policy_loop.history();
    if let Some(best) = history.best() {
        println!(
            "\nBest single run: {} (gain {:.4}) over {:.1} total minutes",
            best.candidate(),
            best.observed_gain(),
            history.total_runtime()
        );
    }

    Ok(())
}
