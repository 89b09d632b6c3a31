//! # Replay Attacks
//!
//! A lock submission repeated with identical vault, amount and asset must be
//! refused while the replay window is open.

#[cfg(test)]
mod tests {
    use crate::fixtures::{as_dyn, quick};
    use shared_types::{BackendId, VaultCreationParams};
    use std::time::Duration;
    use vb_01_backend::{simulated_fleet, SimulatedBackend, SimulationProfile, VaultBackend};
    use vb_06_vuln_scan::{
        IncludeTests, ProbeKind, ScanStatus, SecurityScanConfig, SecurityScanner, TestStatus,
    };

    fn replay_config() -> SecurityScanConfig {
        SecurityScanConfig {
            include_tests: IncludeTests::only(ProbeKind::Replay),
            test_timeout_ms: 5_000,
            ..Default::default()
        }
    }

    async fn vault_on(backend: &SimulatedBackend) -> String {
        let owner = backend.connect().await.unwrap();
        backend
            .create_vault(VaultCreationParams {
                owner_address: owner,
                name: "replay-target".to_string(),
                initial_balance: 0.5,
                initial_asset_type: "ETH".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .vault_id
            .unwrap()
    }

    /// Only the backend without de-duplication is listed as affected.
    #[tokio::test]
    async fn test_replay_pinned_on_unprotected_backend() {
        let mut open = quick(SimulationProfile::solana());
        open.replay_protection = false;
        let fleet = simulated_fleet([
            (BackendId::from("ethereum"), quick(SimulationProfile::ethereum())),
            (BackendId::from("solana"), open),
            (BackendId::from("ton"), quick(SimulationProfile::ton())),
        ]);

        let summary = SecurityScanner::default()
            .run_security_tests(&as_dyn(&fleet), &replay_config())
            .await
            .unwrap();

        assert_eq!(summary.overall_status, ScanStatus::Failed);
        assert_eq!(summary.vulnerabilities.len(), 1);
        assert_eq!(
            summary.vulnerabilities[0].affected_backends,
            vec![BackendId::from("solana")]
        );

        let statuses: Vec<_> = summary
            .results_for(ProbeKind::Replay)
            .map(|r| (r.backend_id.clone().unwrap(), r.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (BackendId::from("ethereum"), TestStatus::Passed),
                (BackendId::from("solana"), TestStatus::Failed),
                (BackendId::from("ton"), TestStatus::Passed),
            ]
        );
    }

    /// Inside the window the replay is rejected and names the first
    /// transaction. Once the window has passed the same submission is a new
    /// transaction.
    #[tokio::test]
    async fn test_replay_window_expires() {
        let mut profile = quick(SimulationProfile::default());
        profile.replay_window_ms = 50;
        let backend = SimulatedBackend::new("windowed", profile);
        let vault_id = vault_on(&backend).await;

        let first = backend.lock_assets(&vault_id, 0.1, "ETH").await.unwrap();
        let replayed = backend.lock_assets(&vault_id, 0.1, "ETH").await.unwrap();
        assert!(first.success);
        assert!(!replayed.success);
        assert!(replayed.error_message.unwrap().contains(&first.tx_hash));

        tokio::time::sleep(Duration::from_millis(80)).await;
        let later = backend.lock_assets(&vault_id, 0.1, "ETH").await.unwrap();
        assert!(later.success);
        assert_ne!(later.tx_hash, first.tx_hash);
    }

    /// Different amounts are distinct transactions, not replays.
    #[tokio::test]
    async fn test_distinct_amounts_are_not_replays() {
        let backend = SimulatedBackend::new("strict", quick(SimulationProfile::default()));
        let vault_id = vault_on(&backend).await;

        let a = backend.lock_assets(&vault_id, 0.1, "ETH").await.unwrap();
        let b = backend.lock_assets(&vault_id, 0.2, "ETH").await.unwrap();

        assert!(a.success && b.success);
        assert_ne!(a.tx_hash, b.tx_hash);
        let info = backend.get_vault_info(&vault_id).await.unwrap();
        assert!((info.balance - 0.8).abs() < 1e-9);
    }
}
