//! # Concurrency Attacks
//!
//! Races on shared vault state: lost balance updates from concurrent locks,
//! and duplicate multisig approvals submitted in parallel.

#[cfg(test)]
mod tests {
    use crate::fixtures::{as_dyn, quick};
    use shared_types::BackendId;
    use vb_01_backend::{simulated_fleet, SimulationProfile};
    use vb_06_vuln_scan::{
        IncludeTests, ProbeKind, ScanStatus, SecurityScanConfig, SecurityScanner, Severity,
        TestStatus,
    };

    fn only(kind: ProbeKind) -> SecurityScanConfig {
        SecurityScanConfig {
            include_tests: IncludeTests::only(kind),
            test_timeout_ms: 10_000,
            race_width: 5,
            ..Default::default()
        }
    }

    /// Read-sleep-write accounting loses concurrent updates; the fixed
    /// latency makes every submission read the same balance.
    #[tokio::test]
    async fn test_lost_update_race_detected() {
        let mut racy = SimulationProfile::default().with_latency(20, 20);
        racy.atomic_balances = false;
        let fleet = simulated_fleet([
            (BackendId::from("atomic"), SimulationProfile::default().with_latency(20, 20)),
            (BackendId::from("racy"), racy),
        ]);

        let summary = SecurityScanner::default()
            .run_security_tests(&as_dyn(&fleet), &only(ProbeKind::RaceConditions))
            .await
            .unwrap();

        assert_eq!(summary.overall_status, ScanStatus::Failed);
        assert_eq!(summary.count_severity(Severity::High), 1);
        assert_eq!(
            summary.vulnerabilities[0].affected_backends,
            vec![BackendId::from("racy")]
        );
        let atomic = summary
            .results
            .iter()
            .find(|r| r.backend_id == Some(BackendId::from("atomic")))
            .unwrap();
        assert_eq!(atomic.status, TestStatus::Passed);
    }

    /// Parallel approvals from one signer must count once.
    #[tokio::test]
    async fn test_duplicate_approvals_detected() {
        let mut lax = quick(SimulationProfile::ton());
        lax.unique_approvals = false;
        let fleet = simulated_fleet([
            (BackendId::from("ethereum"), quick(SimulationProfile::ethereum())),
            (BackendId::from("ton"), lax),
        ]);

        let summary = SecurityScanner::default()
            .run_security_tests(&as_dyn(&fleet), &only(ProbeKind::FrontRunning))
            .await
            .unwrap();

        assert_eq!(summary.vulnerabilities.len(), 1);
        let finding = &summary.vulnerabilities[0];
        assert_eq!(finding.severity, Severity::Medium);
        assert_eq!(finding.affected_backends, vec![BackendId::from("ton")]);
        assert_eq!(summary.overall_status, ScanStatus::Failed);
        assert_eq!(summary.passed_tests, 1);
    }

    /// Concurrent probe execution reaches the same verdicts as sequential.
    #[tokio::test]
    async fn test_concurrent_scan_matches_sequential() {
        let build = || {
            simulated_fleet([
                (BackendId::from("hardened"), quick(SimulationProfile::default())),
                (BackendId::from("weak"), SimulationProfile::default().vulnerable().with_latency(20, 20)),
            ])
        };
        let scanner = SecurityScanner::default();
        let sequential = SecurityScanConfig {
            test_timeout_ms: 10_000,
            ..Default::default()
        };
        let concurrent = SecurityScanConfig {
            concurrent_tests: true,
            ..sequential.clone()
        };

        let a = scanner
            .run_security_tests(&as_dyn(&build()), &sequential)
            .await
            .unwrap();
        let b = scanner
            .run_security_tests(&as_dyn(&build()), &concurrent)
            .await
            .unwrap();

        let verdicts = |s: &vb_06_vuln_scan::ScanSummary| {
            let mut v: Vec<_> = s
                .results
                .iter()
                .map(|r| (r.test_id.clone(), r.status))
                .collect();
            v.sort_by(|x, y| x.0.cmp(&y.0));
            v
        };
        assert_eq!(verdicts(&a), verdicts(&b));
        assert_eq!(a.failed_tests, 7);
        assert_eq!(b.vulnerabilities.len(), 7);
    }
}
