//! Policy engine benchmarks
//!
//! Toyota Way: Genchi Genbutsu (measure, don't guess)
//!
//! Measures the schedule loop (pop + record) and leaderboard selection as
//! the candidate pool grows.
//!
//! Run with: cargo bench --bench policy_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prometheus_tepe::PolicyEngine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [usize; 3] = [10, 1_000, 100_000];

fn seeded_engine(size: usize) -> PolicyEngine {
    let mut rng = StdRng::seed_from_u64(42);
    let mut engine = PolicyEngine::new();
    for i in 0..size {
        engine
            .register(
                format!("h{i}"),
                rng.gen_range(0.0..0.05),
                rng.gen_range(0.5..10.0),
                rng.gen_range(0.01..0.5),
            )
            .unwrap();
    }
    engine
}

/// Benchmark one scheduling step: pop, then record an outcome
fn bench_schedule_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule_step");

    for size in SIZES {
        let mut engine = seeded_engine(size);
        let mut rng = StdRng::seed_from_u64(7);
        group.bench_with_input(BenchmarkId::new("pop_record", size), &size, |b, _| {
            b.iter(|| {
                let next = engine.pop_highest_priority().unwrap();
                let gain = rng.gen_range(-0.01..0.05);
                engine
                    .record_outcome(next.name(), black_box(gain), 3.0, false)
                    .unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark top-10 leaderboard selection
fn bench_leaderboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaderboard_top10");

    for size in SIZES {
        let engine = seeded_engine(size);
        group.bench_with_input(BenchmarkId::new("top_k", size), &engine, |b, engine| {
            b.iter(|| engine.leaderboard(black_box(10)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_schedule_step, bench_leaderboard);
criterion_main!(benches);
