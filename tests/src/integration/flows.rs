//! # Cross-Engine Flows
//!
//! Tests that the engines compose through the framework facade and the
//! backend registry:
//!
//! 1. **Vault lifecycle → consistency**: a vault created and synced on one
//!    backend verifies across its peers
//! 2. **Load → events**: backend events reach subscribers while load runs
//! 3. **Framework**: comprehensive runs, backend selection, provisioning

#[cfg(test)]
mod tests {
    use crate::fixtures::{as_dyn, chain_fleet, quick, registry_of, seeded_fleet, SHARED_VAULT};
    use shared_types::{BackendEvent, BackendId, EventKind, VaultCreationParams};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use vb_01_backend::{SimulationProfile, VaultBackend};
    use vb_02_fanout::FanOutCoordinator;
    use vb_03_consistency::ConsistencyConfig;
    use vb_05_load::{LoadConfig, LoadGenerator, LoadOperation, TransactionDistribution};
    use vb_06_vuln_scan::SecurityScanConfig;
    use vb_07_test_framework::{EnvironmentConfig, FrameworkConfig, FrameworkError, TestFramework};
    use vb_telemetry::DeploymentEnvironment;

    // =========================================================================
    // VAULT LIFECYCLE
    // =========================================================================

    /// Create a vault on one backend, sync it to every peer, then check the
    /// cross-chain view lists each peer as intact.
    #[tokio::test]
    async fn test_created_vault_syncs_to_every_peer() {
        let fleet = chain_fleet();
        let origin = fleet[0].clone();
        let owner = origin.connect().await.unwrap();

        let receipt = origin
            .create_vault(VaultCreationParams {
                owner_address: owner,
                name: "sync-flow".to_string(),
                timelock_secs: Some(3_600),
                initial_balance: 0.25,
                initial_asset_type: "ETH".to_string(),
                cross_chain_enabled: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(receipt.success);
        let vault_id = receipt.vault_id.unwrap();

        let coordinator = FanOutCoordinator::default();
        let peers = as_dyn(&fleet[1..]);
        let synced = coordinator
            .run_across_backends(&peers, Duration::from_secs(2), {
                let origin = origin.clone();
                let vault_id = vault_id.clone();
                move |peer| {
                    let origin = origin.clone();
                    let vault_id = vault_id.clone();
                    async move { origin.initiate_vault_sync(&vault_id, peer.id()).await }
                }
            })
            .await;
        assert_eq!(synced.success_count(), peers.len());

        let view = origin.verify_vault_across_chains(&vault_id).await.unwrap();
        assert_eq!(view.len(), fleet.len());
        assert!(view.values().all(|report| report.is_intact));
    }

    /// Each backend publishes VaultCreated while a create-only load runs.
    #[tokio::test]
    async fn test_load_run_publishes_creation_events() {
        let fleet = seeded_fleet([
            ("ethereum", quick(SimulationProfile::ethereum())),
            ("solana", quick(SimulationProfile::solana())),
        ]);
        let created = Arc::new(AtomicUsize::new(0));
        let _subscriptions: Vec<_> = fleet
            .iter()
            .map(|backend| {
                let created = created.clone();
                backend.subscribe(
                    EventKind::VaultCreated,
                    Arc::new(move |_: &BackendEvent| {
                        created.fetch_add(1, Ordering::SeqCst);
                    }),
                )
            })
            .collect();

        let config = LoadConfig {
            concurrent_transactions: 2,
            test_duration_secs: 1,
            vaults_per_chain: 1,
            transaction_distribution: TransactionDistribution::only(LoadOperation::Create),
            ..Default::default()
        };
        let result = LoadGenerator::default()
            .run_concurrency_test(&as_dyn(&fleet), &config)
            .await
            .unwrap();

        // Setup vaults alone publish one event per backend.
        assert!(created.load(Ordering::SeqCst) >= fleet.len());
        assert!(result.vaults_created >= fleet.len());
    }

    // =========================================================================
    // FRAMEWORK FACADE
    // =========================================================================

    fn quick_framework(fleet: &[Arc<vb_01_backend::SimulatedBackend>]) -> TestFramework {
        TestFramework::new(registry_of(fleet)).with_environment(None)
    }

    #[tokio::test]
    async fn test_comprehensive_run_on_selected_backends() {
        let fleet = chain_fleet();
        let framework = quick_framework(&fleet);
        let config = FrameworkConfig {
            load: Some(LoadConfig {
                concurrent_transactions: 3,
                test_duration_secs: 1,
                vaults_per_chain: 1,
                ..Default::default()
            }),
            security: Some(SecurityScanConfig {
                test_timeout_ms: 5_000,
                ..Default::default()
            }),
            backends: Some(vec![BackendId::from("solana"), BackendId::from("ton")]),
            ..Default::default()
        };

        let report = framework.run_comprehensive(&config).await.unwrap();

        assert_eq!(
            report.testing_environment.backends,
            vec![BackendId::from("solana"), BackendId::from("ton")]
        );
        assert_eq!(
            report.testing_environment.environment,
            DeploymentEnvironment::Development
        );
        let load = report.load.as_ref().unwrap();
        assert!(load.per_backend.keys().all(|id| id.as_str() == "solana" || id.as_str() == "ton"));
        assert_eq!(report.health.security, Some(100));
        assert!(report.environment.is_none());
        assert!(!report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_framework_verifies_seeded_vault() {
        let fleet = seeded_fleet([
            ("ethereum", quick(SimulationProfile::ethereum())),
            ("arbitrum", quick(SimulationProfile::arbitrum())),
        ]);
        let framework = quick_framework(&fleet);

        let report = framework
            .verify_vault(SHARED_VAULT, None, &ConsistencyConfig::default())
            .await
            .unwrap();

        assert!(report.verification_success);
        assert_eq!(report.consistency_score, 100);
    }

    #[tokio::test]
    async fn test_framework_rejects_unknown_backend_selection() {
        let fleet = chain_fleet();
        let framework = quick_framework(&fleet);
        let config = FrameworkConfig {
            load: Some(LoadConfig::default()),
            backends: Some(vec![BackendId::from("dogecoin")]),
            ..Default::default()
        };

        let err = framework.run_comprehensive(&config).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Registry(_)));
    }

    /// Provisioned vaults are readable on the backend that owns them.
    #[tokio::test]
    async fn test_provisioned_vaults_exist_on_their_backends() {
        let fleet = chain_fleet();
        let framework = quick_framework(&fleet);
        let config = EnvironmentConfig {
            name: "flow-env".to_string(),
            wallet_count: 5,
            vaults_per_wallet: 1,
            seed: Some(7),
            ..Default::default()
        };

        let env = framework.provision_environment(&config).await.unwrap();

        assert_eq!(env.vaults.len(), 5);
        for vault in &env.vaults {
            let backend = framework.registry().get(&vault.backend_id).unwrap();
            let info = backend.get_vault_info(&vault.vault_id).await.unwrap();
            assert_eq!(info.vault_id, vault.vault_id);
        }
    }
}
