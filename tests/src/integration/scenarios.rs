//! # Acceptance Scenarios
//!
//! End-to-end runs of each engine against small simulated fleets, checking
//! the externally visible verdicts.

#[cfg(test)]
mod tests {
    use crate::fixtures::{as_dyn, quick, seeded_fleet, SHARED_VAULT};
    use shared_types::{BackendId, ErrorCode};
    use std::time::{Duration, Instant};
    use vb_01_backend::{FaultMode, SimulatedOp, SimulationProfile};
    use vb_03_consistency::{ConsistencyConfig, ConsistencyVerifier};
    use vb_04_benchmark::{BenchmarkConfig, BenchmarkEngine, IncludeOperations};
    use vb_05_load::{LoadConfig, LoadGenerator, LoadOperation, TransactionDistribution};
    use vb_06_vuln_scan::{
        IncludeTests, ProbeKind, ScanStatus, SecurityScanConfig, SecurityScanner, Severity,
        TestStatus,
    };

    /// Three backends, one of which fails integrity verification. Partial
    /// success is tolerated, and the score is 0.6 * 2/3 + 0.4 * 5/5.
    #[tokio::test]
    async fn test_scenario_partial_integrity_failure() {
        let fleet = seeded_fleet([
            ("ethereum", quick(SimulationProfile::ethereum())),
            ("solana", quick(SimulationProfile::solana())),
            (
                "ton",
                quick(SimulationProfile::ton())
                    .with_fault(SimulatedOp::VerifyIntegrity, FaultMode::Fail),
            ),
        ]);
        let verifier = ConsistencyVerifier::new(ConsistencyConfig {
            max_retries: 0,
            require_all_backends: false,
            ..Default::default()
        });

        let report = verifier
            .verify_across_backends(SHARED_VAULT, &as_dyn(&fleet))
            .await
            .unwrap();

        assert!(report.verification_success);
        assert_eq!(report.consistency_score, 80);
        assert_eq!(report.successful_backends().count(), 2);
        let ton: Vec<_> = report.failed_backends().collect();
        assert_eq!(ton.len(), 1);
        assert_eq!(ton[0].backend_id, BackendId::from("ton"));
        assert!(report.inconsistencies.is_empty());
    }

    /// Same fleet, but every backend is required.
    #[tokio::test]
    async fn test_scenario_partial_failure_with_all_required() {
        let fleet = seeded_fleet([
            ("ethereum", quick(SimulationProfile::ethereum())),
            (
                "ton",
                quick(SimulationProfile::ton())
                    .with_fault(SimulatedOp::VerifyIntegrity, FaultMode::Fail),
            ),
        ]);
        let verifier = ConsistencyVerifier::new(ConsistencyConfig {
            max_retries: 0,
            require_all_backends: true,
            ..Default::default()
        });

        let report = verifier
            .verify_across_backends(SHARED_VAULT, &as_dyn(&fleet))
            .await
            .unwrap();

        assert!(!report.verification_success);
    }

    /// A backend that accepts an identical lock twice with a fresh tx id is
    /// reported with a high-severity replay finding.
    #[tokio::test]
    async fn test_scenario_replay_accepted() {
        let fleet = seeded_fleet([("weak", quick(SimulationProfile::default().vulnerable()))]);
        let scanner = SecurityScanner::default();
        let config = SecurityScanConfig {
            include_tests: IncludeTests::only(ProbeKind::Replay),
            test_timeout_ms: 5_000,
            ..Default::default()
        };

        let summary = scanner
            .run_security_tests(&as_dyn(&fleet), &config)
            .await
            .unwrap();

        assert_eq!(summary.overall_status, ScanStatus::Failed);
        assert_eq!(summary.vulnerabilities.len(), 1);
        let finding = &summary.vulnerabilities[0];
        assert_eq!(finding.name, "Transaction Replay Vulnerability");
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(summary.results[0].status, TestStatus::Failed);
    }

    /// Create-only load with 5 workers for 1 s runs at least one operation
    /// per worker and stops on time.
    #[tokio::test]
    async fn test_scenario_create_only_load() {
        let fleet = seeded_fleet([
            ("ethereum", quick(SimulationProfile::ethereum())),
            ("solana", quick(SimulationProfile::solana())),
        ]);
        let generator = LoadGenerator::default();
        let config = LoadConfig {
            concurrent_transactions: 5,
            test_duration_secs: 1,
            vaults_per_chain: 1,
            transaction_distribution: TransactionDistribution::only(LoadOperation::Create),
            max_jitter_ms: 5,
            ..Default::default()
        };

        let started = Instant::now();
        let result = generator
            .run_concurrency_test(&as_dyn(&fleet), &config)
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(result.total_operations >= 5);
        assert_eq!(result.succeeded + result.failed, result.total_operations);
        assert!(result.succeeded >= 5);
    }

    /// A backend whose every benchmarked call fails scores zero performance
    /// and zero reliability without aborting the run.
    #[tokio::test]
    async fn test_scenario_no_successful_operations() {
        let fleet = seeded_fleet([
            ("healthy", quick(SimulationProfile::default())),
            (
                "broken",
                quick(SimulationProfile::default())
                    .with_fault(SimulatedOp::CreateVault, FaultMode::Fail),
            ),
        ]);
        let engine = BenchmarkEngine::default();
        let config = BenchmarkConfig {
            operations_per_chain: 4,
            include_operations: IncludeOperations {
                create: true,
                read: false,
                update: false,
                delete: false,
                query: false,
            },
            warmup_iterations: 0,
            cooldown_ms: 0,
            timeout_ms: 2_000,
            ..Default::default()
        };

        let report = engine.run_benchmarks(&as_dyn(&fleet), &config).await.unwrap();

        let broken = report
            .per_backend
            .iter()
            .find(|b| b.backend_id == BackendId::from("broken"))
            .unwrap();
        assert_eq!(broken.scores.performance, 0);
        assert_eq!(broken.scores.reliability, 0);
        assert_eq!(broken.total_successes(), 0);
        assert_eq!(report.rankings.fastest, Some(BackendId::from("healthy")));
        assert_eq!(report.rankings.most_reliable, Some(BackendId::from("healthy")));
    }

    /// Integrity failure of one backend surfaces with its own error code.
    #[tokio::test]
    async fn test_tampered_vault_reports_integrity_failure() {
        let fleet = seeded_fleet([
            ("ethereum", quick(SimulationProfile::ethereum())),
            ("solana", quick(SimulationProfile::solana())),
        ]);
        fleet[1].tamper_vault(SHARED_VAULT, |info| info.balance += 100.0);
        let verifier = ConsistencyVerifier::new(ConsistencyConfig::default());

        let report = verifier
            .verify_across_backends(SHARED_VAULT, &as_dyn(&fleet))
            .await
            .unwrap();

        let solana = &report.backend_results[1];
        assert_eq!(solana.error_code, Some(ErrorCode::IntegrityFailed));
    }
}
