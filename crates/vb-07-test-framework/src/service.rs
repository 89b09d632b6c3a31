//! # Test Framework Facade
//!
//! Entry points over the registered backends. Each engine is a stateless
//! value built per call; the framework only owns the registry handle and
//! the coordinator settings.

use crate::config::FrameworkConfig;
use crate::domain::{
    build_recommendations, compute_health, determine_environment, ComprehensiveReport,
    TestingEnvironment,
};
use crate::error::FrameworkResult;
use crate::provisioning::{EnvironmentConfig, EnvironmentProvisioner, ProvisionedEnvironment};
use chrono::Utc;
use shared_types::BackendId;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use vb_01_backend::{BackendRegistry, DynBackend};
use vb_02_fanout::FanOutCoordinator;
use vb_03_consistency::{ConsistencyConfig, ConsistencyReport, ConsistencyVerifier};
use vb_04_benchmark::{BenchmarkConfig, BenchmarkEngine, BenchmarkReport};
use vb_05_load::{LoadConfig, LoadGenerator, LoadTestResult};
use vb_06_vuln_scan::{ScanSummary, SecurityScanConfig, SecurityScanner};
use vb_telemetry::{DeploymentEnvironment, TelemetryConfig};

/// Comprehensive test facade.
pub struct TestFramework {
    registry: Arc<BackendRegistry>,
    coordinator: FanOutCoordinator,
    declared_environment: Option<DeploymentEnvironment>,
}

impl TestFramework {
    /// Facade over `registry`. The declared deployment environment is read
    /// from `VB_ENVIRONMENT`.
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self {
            registry,
            coordinator: FanOutCoordinator::default(),
            declared_environment: TelemetryConfig::from_env().environment,
        }
    }

    pub fn with_coordinator(mut self, coordinator: FanOutCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn with_environment(mut self, environment: Option<DeploymentEnvironment>) -> Self {
        self.declared_environment = environment;
        self
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Backends for a run: `ids` in order, or every registered backend.
    fn select(&self, ids: Option<&[BackendId]>) -> FrameworkResult<Vec<DynBackend>> {
        match ids {
            Some(ids) => Ok(self.registry.resolve(ids)?),
            None => Ok(self.registry.all()),
        }
    }

    pub async fn run_benchmarks(
        &self,
        config: &BenchmarkConfig,
    ) -> FrameworkResult<BenchmarkReport> {
        info!("[Framework] Running benchmarks");
        let backends = self.select(None)?;
        let report = BenchmarkEngine::new(self.coordinator.clone())
            .run_benchmarks(&backends, config)
            .await?;
        Ok(report)
    }

    pub async fn run_load_test(&self, config: &LoadConfig) -> FrameworkResult<LoadTestResult> {
        info!("[Framework] Running load test");
        let backends = self.select(None)?;
        let result = LoadGenerator::new(self.coordinator.clone())
            .run_concurrency_test(&backends, config)
            .await?;
        Ok(result)
    }

    pub async fn run_security_scan(
        &self,
        config: &SecurityScanConfig,
    ) -> FrameworkResult<ScanSummary> {
        info!("[Framework] Running security scan");
        let backends = self.select(None)?;
        let summary = SecurityScanner::new(self.coordinator.clone())
            .run_security_tests(&backends, config)
            .await?;
        Ok(summary)
    }

    /// Verify one vault across `backends`, or across every registered
    /// backend.
    pub async fn verify_vault(
        &self,
        vault_id: &str,
        backends: Option<&[BackendId]>,
        config: &ConsistencyConfig,
    ) -> FrameworkResult<ConsistencyReport> {
        let backends = self.select(backends)?;
        let report = ConsistencyVerifier::new(config.clone())
            .with_coordinator(self.coordinator.clone())
            .verify_across_backends(vault_id, &backends)
            .await?;
        Ok(report)
    }

    pub async fn provision_environment(
        &self,
        config: &EnvironmentConfig,
    ) -> FrameworkResult<ProvisionedEnvironment> {
        info!("[Framework] Provisioning environment {}", config.name);
        let backends = self.select(None)?;
        let environment = EnvironmentProvisioner::new(self.coordinator.clone())
            .provision(&backends, config)
            .await?;
        Ok(environment)
    }

    /// Run load, security and provisioning sub-runs in that order, each only
    /// when configured, then score overall health.
    pub async fn run_comprehensive(
        &self,
        config: &FrameworkConfig,
    ) -> FrameworkResult<ComprehensiveReport> {
        config.validate()?;
        let backends = self.select(config.backends.as_deref())?;
        let started = Instant::now();
        info!(
            backends = backends.len(),
            load = config.load.is_some(),
            security = config.security.is_some(),
            provisioning = config.environment.is_some(),
            "[Framework] Starting comprehensive run"
        );

        let testing_environment = TestingEnvironment {
            backends: backends.iter().map(|b| b.id().clone()).collect(),
            any_test_mode: backends.iter().any(|b| b.is_test_mode()),
            environment: determine_environment(
                self.declared_environment,
                backends.iter().all(|b| b.is_test_mode()),
            ),
        };

        let load = match &config.load {
            Some(load_config) => Some(
                LoadGenerator::new(self.coordinator.clone())
                    .run_concurrency_test(&backends, load_config)
                    .await?,
            ),
            None => None,
        };
        let security = match &config.security {
            Some(scan_config) => Some(
                SecurityScanner::new(self.coordinator.clone())
                    .run_security_tests(&backends, scan_config)
                    .await?,
            ),
            None => None,
        };
        let environment = match &config.environment {
            Some(env_config) => Some(
                EnvironmentProvisioner::new(self.coordinator.clone())
                    .provision(&backends, env_config)
                    .await?,
            ),
            None => None,
        };

        let health = compute_health(load.as_ref(), security.as_ref());
        let recommendations = build_recommendations(load.as_ref(), security.as_ref());
        let report = ComprehensiveReport {
            timestamp: Utc::now(),
            testing_environment,
            load,
            security,
            environment,
            health,
            recommendations,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            reliability = ?report.health.reliability,
            security = ?report.health.security,
            performance = ?report.health.performance,
            robustness = ?report.health.robustness,
            "[Framework] Comprehensive run completed in {}ms",
            report.duration_ms
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameworkError;
    use shared_types::{ConfigError, VaultCreationParams};
    use vb_01_backend::{simulated_fleet, SimulationProfile};
    use vb_05_load::TransactionDistribution;
    use vb_06_vuln_scan::{IncludeTests, ProbeKind, ScanStatus};

    fn registry(profiles: Vec<(&str, SimulationProfile)>) -> Arc<BackendRegistry> {
        let registry = Arc::new(BackendRegistry::new());
        let fleet = simulated_fleet(
            profiles
                .into_iter()
                .map(|(id, profile)| (BackendId::from(id), profile)),
        );
        for backend in fleet {
            registry.register(backend);
        }
        registry
    }

    fn quick_load() -> LoadConfig {
        LoadConfig {
            concurrent_transactions: 2,
            test_duration_secs: 1,
            vaults_per_chain: 1,
            max_jitter_ms: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_comprehensive_run_scores_every_sub_run() {
        let framework = TestFramework::new(registry(vec![
            ("eth", SimulationProfile::default()),
            ("sol", SimulationProfile::solana().with_latency(1, 3)),
        ]))
        .with_environment(None);
        let config = FrameworkConfig {
            load: Some(LoadConfig {
                transaction_distribution: TransactionDistribution {
                    create: 0,
                    lock: 0,
                    unlock: 0,
                    verify: 100,
                    multi_sig: 0,
                    cross_chain: 0,
                },
                ..quick_load()
            }),
            security: Some(SecurityScanConfig {
                test_timeout_ms: 2_000,
                ..Default::default()
            }),
            ..Default::default()
        };

        let report = framework.run_comprehensive(&config).await.unwrap();

        assert_eq!(
            report.testing_environment.environment,
            DeploymentEnvironment::Development
        );
        assert!(report.testing_environment.any_test_mode);
        // Calls cut off by the deadline may time out.
        assert!(report.health.reliability.unwrap() >= 95);
        assert_eq!(report.health.security, Some(100));
        assert!(report.health.performance.is_some());
        assert!(report.health.robustness.is_some());
        assert_eq!(report.security.as_ref().unwrap().overall_status, ScanStatus::Passed);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("[SECURITY] Implement Regular Security Audits")));
        assert!(report.environment.is_none());
    }

    #[tokio::test]
    async fn test_comprehensive_security_only() {
        let framework = TestFramework::new(registry(vec![(
            "weak",
            SimulationProfile::default().vulnerable(),
        )]))
        .with_environment(None);
        let config = FrameworkConfig {
            security: Some(SecurityScanConfig {
                include_tests: IncludeTests::only(ProbeKind::AccessControlBypass),
                test_timeout_ms: 2_000,
                ..Default::default()
            }),
            ..Default::default()
        };

        let report = framework.run_comprehensive(&config).await.unwrap();

        // 0 passed, one critical: 0 - 20 - 2
        assert_eq!(report.health.security, Some(0));
        assert_eq!(report.health.reliability, None);
        assert_eq!(report.health.robustness, Some(0));
        assert!(report.recommendations[0]
            .starts_with("[SECURITY] Fix Timelock Access Control Bypass"));
    }

    #[tokio::test]
    async fn test_unknown_backend_selection_fails() {
        let framework = TestFramework::new(registry(vec![("eth", SimulationProfile::default())]));
        let config = FrameworkConfig {
            backends: Some(vec![BackendId::from("ton")]),
            ..Default::default()
        };
        let err = framework.run_comprehensive(&config).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Registry(_)));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_run() {
        let framework = TestFramework::new(registry(vec![("eth", SimulationProfile::default())]));
        let config = FrameworkConfig {
            load: Some(LoadConfig {
                concurrent_transactions: 0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = framework.run_comprehensive(&config).await.unwrap_err();
        assert!(matches!(
            err,
            FrameworkError::Config(ConfigError::ZeroValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_verify_vault_through_registry() {
        let registry = registry(vec![
            ("eth", SimulationProfile::default()),
            ("sol", SimulationProfile::solana().with_latency(1, 3)),
        ]);
        let framework = TestFramework::new(Arc::clone(&registry));

        let eth = registry.get(&BackendId::from("eth")).unwrap();
        eth.connect().await.unwrap();
        let receipt = eth
            .create_vault(VaultCreationParams {
                initial_balance: 1.0,
                ..Default::default()
            })
            .await
            .unwrap();
        let vault_id = receipt.vault_id.unwrap();

        let only_eth = [BackendId::from("eth")];
        let report = framework
            .verify_vault(&vault_id, Some(&only_eth), &ConsistencyConfig::default())
            .await
            .unwrap();
        assert!(report.verification_success);
        assert_eq!(report.backend_results.len(), 1);
    }

    #[tokio::test]
    async fn test_security_scan_over_registry() {
        let framework = TestFramework::new(registry(vec![
            ("eth", SimulationProfile::default()),
            ("weak", SimulationProfile::default().vulnerable()),
        ]));
        let summary = framework
            .run_security_scan(&SecurityScanConfig {
                include_tests: IncludeTests::only(ProbeKind::AccessControlBypass),
                test_timeout_ms: 2_000,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(summary.total_tests, 2);
        assert_eq!(summary.passed_tests, 1);
        assert_eq!(summary.overall_status, ScanStatus::Failed);
        assert_eq!(summary.vulnerabilities.len(), 1);
        assert!(summary.vulnerabilities[0]
            .affected_backends
            .contains(&BackendId::from("weak")));
    }

    #[tokio::test]
    async fn test_empty_registry_reports_no_backends() {
        let framework = TestFramework::new(Arc::new(BackendRegistry::new()));
        let err = framework.run_load_test(&quick_load()).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Config(ConfigError::NoBackends)));
    }
}
