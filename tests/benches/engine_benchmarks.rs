//! # Vault-Bench Engine Benchmarks
//!
//! Overhead of the engine internals, with backend latency taken out:
//!
//! | Area | What is measured |
//! |------|------------------|
//! | Fan-out | Spawn, bound and settle one call per backend |
//! | Aggregation | Percentiles over latency samples |
//! | Scoring | Benchmark scores and rankings |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_types::{BackendId, LatencyPercentiles};
use std::time::Duration;
use vb_01_backend::{simulated_fleet, DynBackend, SimulationProfile};
use vb_02_fanout::FanOutCoordinator;
use vb_04_benchmark::domain::scoring::{rank, score};
use vb_04_benchmark::{BackendAverages, BackendBenchmark};

// ============================================================================
// Fan-out
// ============================================================================

fn instant_fleet(size: usize) -> Vec<DynBackend> {
    simulated_fleet((0..size).map(|i| {
        (
            BackendId::from(format!("backend-{}", i)),
            SimulationProfile::default().with_latency(0, 0),
        )
    }))
    .into_iter()
    .map(|b| b as DynBackend)
    .collect()
}

fn bench_fanout(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let coordinator = FanOutCoordinator::default();

    let mut group = c.benchmark_group("vb-02-fanout");
    for size in [1usize, 8, 64, 256] {
        let fleet = instant_fleet(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("balance_across_backends", size), &fleet, |b, fleet| {
            b.to_async(&runtime).iter(|| async {
                let result = coordinator
                    .run_across_backends(fleet, Duration::from_secs(1), |backend| async move {
                        backend.get_balance("0xbench").await
                    })
                    .await;
                black_box(result.success_count())
            })
        });
    }

    let single = instant_fleet(1).remove(0);
    for width in [10usize, 100] {
        group.bench_with_input(BenchmarkId::new("concurrent_on_one", width), &width, |b, &width| {
            b.to_async(&runtime).iter(|| async {
                let result = coordinator
                    .run_concurrent(&single, width, Duration::from_secs(1), |backend, _| async move {
                        backend.get_balance("0xbench").await
                    })
                    .await;
                black_box(result.len())
            })
        });
    }
    group.finish();
}

// ============================================================================
// Aggregation
// ============================================================================

fn bench_percentiles(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-types-stats");
    let mut rng = rand::thread_rng();

    for size in [100usize, 10_000, 100_000] {
        let samples: Vec<u64> = (0..size).map(|_| rng.gen_range(1..5_000)).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("latency_percentiles", size), &samples, |b, samples| {
            b.iter(|| {
                let mut copy = samples.clone();
                black_box(LatencyPercentiles::from_samples(&mut copy))
            })
        });
    }
    group.finish();
}

// ============================================================================
// Scoring
// ============================================================================

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("vb-04-scoring");
    let mut rng = rand::thread_rng();

    let results: Vec<BackendBenchmark> = (0..50)
        .map(|i| {
            let averages = BackendAverages {
                confirmation_time_ms: rng.gen_range(1.0..20_000.0),
                cost_usd: rng.gen_range(0.0..5.0),
                success_rate: rng.gen_range(50.0..100.0),
                throughput_tps: rng.gen_range(0.1..50.0),
            };
            BackendBenchmark {
                backend_id: BackendId::from(format!("backend-{}", i)),
                display_name: format!("Backend {}", i),
                native_currency: "ETH".to_string(),
                operations: Vec::new(),
                averages,
                scores: score(&averages, 10),
                strengths: Vec::new(),
                weaknesses: Vec::new(),
            }
        })
        .collect();

    group.bench_function("score_single", |b| {
        let averages = results[0].averages;
        b.iter(|| black_box(score(black_box(&averages), 10)))
    });
    group.bench_function("rank_50_backends", |b| b.iter(|| black_box(rank(&results))));
    group.finish();
}

criterion_group!(benches, bench_fanout, bench_percentiles, bench_scoring);

criterion_main!(benches);
