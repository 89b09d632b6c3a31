//! # Engine Properties
//!
//! Behavior every engine must keep regardless of backend mix:
//!
//! 1. **Score bounds**: every computed score stays in `[0, 100]`
//! 2. **Fan-out isolation**: a failing or hanging backend never disturbs the
//!    others, and the call returns once the per-task timeout elapses
//! 3. **Consistency idempotence**: unchanged backends give identical reports
//! 4. **Ranking**: `fastest` is the first backend with the top performance score
//! 5. **Percentiles**: `ceil(pct / 100 * n) - 1` indexing

#[cfg(test)]
mod tests {
    use crate::fixtures::{as_dyn, quick, seeded_fleet, SHARED_VAULT};
    use proptest::prelude::*;
    use shared_types::{percentile, BackendId, ErrorCode, LatencyPercentiles};
    use std::time::{Duration, Instant};
    use vb_01_backend::{FaultMode, SimulatedOp, SimulationProfile};
    use vb_02_fanout::FanOutCoordinator;
    use vb_03_consistency::{ConsistencyConfig, ConsistencyVerifier};
    use vb_04_benchmark::domain::scoring::{rank, score};
    use vb_04_benchmark::{
        BackendAverages, BackendBenchmark, BenchmarkConfig, BenchmarkEngine, BenchmarkScores,
    };

    // =========================================================================
    // SCORE BOUNDS
    // =========================================================================

    proptest! {
        #[test]
        fn prop_benchmark_scores_stay_in_range(
            confirmation_time_ms in -1.0e6f64..1.0e7,
            cost_usd in -1.0e3f64..1.0e6,
            success_rate in -50.0f64..250.0,
            throughput_tps in -10.0f64..1.0e5,
            successes in 0usize..1_000,
        ) {
            let averages = BackendAverages {
                confirmation_time_ms,
                cost_usd,
                success_rate,
                throughput_tps,
            };
            let scores = score(&averages, successes);
            prop_assert!(scores.performance <= 100);
            prop_assert!(scores.reliability <= 100);
            prop_assert!(scores.cost_efficiency <= 100);
            prop_assert!(scores.overall <= 100);
        }

        #[test]
        fn prop_no_successes_means_zero_performance(
            confirmation_time_ms in 0.0f64..1.0e5,
            throughput_tps in 0.0f64..1.0e4,
        ) {
            let averages = BackendAverages {
                confirmation_time_ms,
                throughput_tps,
                ..Default::default()
            };
            prop_assert_eq!(score(&averages, 0).performance, 0);
        }

        #[test]
        fn prop_percentiles_are_ordered(mut samples in prop::collection::vec(0u64..100_000, 1..500)) {
            let p = LatencyPercentiles::from_samples(&mut samples);
            prop_assert!(p.p50 <= p.p90);
            prop_assert!(p.p90 <= p.p95);
            prop_assert!(p.p95 <= p.p99);
            prop_assert!(p.p99 <= *samples.last().unwrap());
        }
    }

    /// NaN inputs must not leak out as out-of-range scores.
    #[test]
    fn test_nan_averages_clamp_to_zero() {
        let averages = BackendAverages {
            confirmation_time_ms: f64::NAN,
            cost_usd: f64::NAN,
            success_rate: f64::NAN,
            throughput_tps: f64::NAN,
        };
        let scores = score(&averages, 3);
        assert_eq!(scores, BenchmarkScores::default());
    }

    // =========================================================================
    // FAN-OUT ISOLATION
    // =========================================================================

    /// One backend hangs, one fails, three are healthy. The healthy ones
    /// succeed and the call settles shortly after the per-task timeout.
    #[tokio::test]
    async fn test_fanout_isolates_hanging_and_failing_backends() {
        let fleet = seeded_fleet([
            ("alpha", quick(SimulationProfile::default())),
            (
                "hang",
                SimulationProfile::default().with_fault(SimulatedOp::GetVaultInfo, FaultMode::Hang),
            ),
            ("beta", quick(SimulationProfile::default())),
            (
                "fail",
                SimulationProfile::default().with_fault(SimulatedOp::GetVaultInfo, FaultMode::Fail),
            ),
            ("gamma", quick(SimulationProfile::default())),
        ]);
        let coordinator = FanOutCoordinator::default();
        let timeout = Duration::from_millis(200);

        let started = Instant::now();
        let result = coordinator
            .run_across_backends(&as_dyn(&fleet), timeout, |backend| async move {
                backend.get_vault_info(SHARED_VAULT).await
            })
            .await;
        let elapsed = started.elapsed();

        assert!(
            elapsed < timeout + Duration::from_millis(300),
            "fan-out took {:?}",
            elapsed
        );
        assert_eq!(result.len(), 5);
        assert_eq!(result.success_count(), 3);

        let hang = result.get(&BackendId::from("hang")).unwrap();
        assert_eq!(hang.outcome.error_code, Some(ErrorCode::Timeout));
        let fail = result.get(&BackendId::from("fail")).unwrap();
        assert_eq!(fail.outcome.error_code, Some(ErrorCode::Exception));

        for healthy in ["alpha", "beta", "gamma"] {
            let settled = result.get(&BackendId::from(healthy)).unwrap();
            assert_eq!(settled.success_value().unwrap().balance, 1.5);
        }
    }

    /// A panicking unit of work is contained like any other failure.
    #[tokio::test]
    async fn test_fanout_contains_panics() {
        let fleet = seeded_fleet([
            ("alpha", quick(SimulationProfile::default())),
            ("boom", quick(SimulationProfile::default())),
        ]);
        let coordinator = FanOutCoordinator::default();

        let result = coordinator
            .run_across_backends(&as_dyn(&fleet), Duration::from_secs(1), |backend| async move {
                if backend.id().as_str() == "boom" {
                    panic!("unit of work exploded");
                }
                backend.get_vault_info(SHARED_VAULT).await
            })
            .await;

        assert!(result.get(&BackendId::from("alpha")).unwrap().succeeded());
        let boom = result.get(&BackendId::from("boom")).unwrap();
        assert!(!boom.succeeded());
        assert_eq!(boom.outcome.error_code, Some(ErrorCode::Exception));
    }

    // =========================================================================
    // CONSISTENCY IDEMPOTENCE
    // =========================================================================

    #[tokio::test]
    async fn test_consistency_verification_is_idempotent() {
        let fleet = seeded_fleet([
            ("ethereum", quick(SimulationProfile::ethereum())),
            ("solana", quick(SimulationProfile::solana())),
            ("ton", quick(SimulationProfile::ton())),
        ]);
        let mut diverged = crate::fixtures::shared_vault();
        diverged.balance = 7.0;
        fleet[2].seed_vault(diverged);

        let verifier = ConsistencyVerifier::new(ConsistencyConfig::default());
        let backends = as_dyn(&fleet);
        let first = verifier
            .verify_across_backends(SHARED_VAULT, &backends)
            .await
            .unwrap();
        let second = verifier
            .verify_across_backends(SHARED_VAULT, &backends)
            .await
            .unwrap();

        assert!(!first.inconsistencies.is_empty());
        assert_eq!(first.consistency_score, second.consistency_score);
        assert_eq!(first.inconsistencies, second.inconsistencies);
        assert_eq!(first.data_consistency, second.data_consistency);
    }

    // =========================================================================
    // RANKING
    // =========================================================================

    fn scored(id: &str, performance: u8) -> BackendBenchmark {
        BackendBenchmark {
            backend_id: BackendId::from(id),
            display_name: id.to_string(),
            native_currency: "ETH".to_string(),
            operations: Vec::new(),
            averages: BackendAverages::default(),
            scores: BenchmarkScores {
                performance,
                reliability: 100,
                cost_efficiency: 50,
                overall: 70,
            },
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        }
    }

    #[test]
    fn test_fastest_ties_resolve_to_first_registered() {
        let results = vec![scored("first", 80), scored("second", 91), scored("third", 91)];
        let rankings = rank(&results);
        assert_eq!(rankings.fastest, Some(BackendId::from("second")));
        // All tied on reliability.
        assert_eq!(rankings.most_reliable, Some(BackendId::from("first")));
    }

    #[tokio::test]
    async fn test_benchmark_fastest_matches_top_performance() {
        let fleet = seeded_fleet([
            ("slow", SimulationProfile::default().with_latency(30, 40)),
            ("fast", SimulationProfile::default().with_latency(1, 2)),
            ("mid", SimulationProfile::default().with_latency(10, 15)),
        ]);
        let engine = BenchmarkEngine::default();
        let config = BenchmarkConfig {
            operations_per_chain: 3,
            warmup_iterations: 0,
            cooldown_ms: 0,
            timeout_ms: 2_000,
            ..Default::default()
        };

        let report = engine.run_benchmarks(&as_dyn(&fleet), &config).await.unwrap();

        let top = report
            .per_backend
            .iter()
            .map(|b| b.scores.performance)
            .max()
            .unwrap();
        let expected = report
            .per_backend
            .iter()
            .find(|b| b.scores.performance == top)
            .map(|b| b.backend_id.clone());
        assert_eq!(report.rankings.fastest, expected);
    }

    // =========================================================================
    // PERCENTILES
    // =========================================================================

    #[test]
    fn test_percentiles_of_hundred_samples() {
        let mut samples: Vec<u64> = (1..=100).map(|i| i * 10).collect();
        let p = LatencyPercentiles::from_samples(&mut samples);
        assert_eq!(p.p50, 500);
        assert_eq!(p.p90, 900);
        assert_eq!(p.p95, 950);
        assert_eq!(p.p99, 990);
    }

    #[test]
    fn test_percentile_of_unsorted_input_after_sort() {
        let mut samples: Vec<u64> = (1..=100).rev().map(|i| i * 10).collect();
        samples.sort_unstable();
        assert_eq!(percentile(&samples, 50.0), 500);
        assert_eq!(percentile(&[], 99.0), 0);
        assert_eq!(percentile(&[42], 1.0), 42);
    }
}
