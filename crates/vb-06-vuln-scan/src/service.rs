//! # Security Scan Service
//!
//! Creates timelocked scan vaults, then fans every enabled probe out to the
//! backends that received one. Probe verdicts become test results; each
//! probe that found something produces one vulnerability listing every
//! affected backend.

use crate::config::SecurityScanConfig;
use crate::domain::{
    build_recommendations, overall_status, ProbeKind, ScanSummary, TestResult, TestStatus,
    Vulnerability,
};
use crate::ports::{DynProbe, ProbeFinding, ProbeTarget};
use crate::probes::probe_for;
use chrono::Utc;
use futures::future::join_all;
use shared_types::{BackendId, ConfigError, TestVault, VaultCreationParams};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;
use vb_01_backend::DynBackend;
use vb_02_fanout::{FanOutCoordinator, Settled};
use vb_telemetry::{ENGINE_RUNS, VULNERABILITIES_FOUND};

const SCAN_VAULT_BALANCE: f64 = 0.5;

/// Adversarial scan orchestrator.
#[derive(Clone)]
pub struct SecurityScanner {
    coordinator: FanOutCoordinator,
    probes: Vec<DynProbe>,
}

impl Default for SecurityScanner {
    fn default() -> Self {
        Self::new(FanOutCoordinator::default())
    }
}

impl SecurityScanner {
    /// Scanner with every built-in probe.
    pub fn new(coordinator: FanOutCoordinator) -> Self {
        Self {
            coordinator,
            probes: ProbeKind::ALL.into_iter().map(probe_for).collect(),
        }
    }

    /// Replace the built-in probe for the probe's kind.
    pub fn with_probe(mut self, probe: DynProbe) -> Self {
        let kind = probe.kind();
        match self.probes.iter().position(|p| p.kind() == kind) {
            Some(index) => self.probes[index] = probe,
            None => self.probes.push(probe),
        }
        self
    }

    /// Run every enabled probe against every backend that received a scan
    /// vault.
    pub async fn run_security_tests(
        &self,
        backends: &[DynBackend],
        config: &SecurityScanConfig,
    ) -> Result<ScanSummary, ConfigError> {
        config.validate()?;
        if backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }

        let started = Instant::now();
        let enabled = config.include_tests.enabled();
        info!(
            backends = backends.len(),
            probes = enabled.len(),
            concurrent = config.concurrent_tests,
            "[VulnScan] Starting security scan"
        );

        let vaults = self.setup(backends, config).await;
        let with_vaults: HashSet<&BackendId> = vaults.keys().collect();
        let targets: Vec<DynBackend> = backends
            .iter()
            .filter(|b| with_vaults.contains(b.id()))
            .cloned()
            .collect();
        let excluded: Vec<BackendId> = backends
            .iter()
            .map(|b| b.id().clone())
            .filter(|id| !with_vaults.contains(id))
            .collect();
        for id in &excluded {
            warn!(backend = %id, "[VulnScan] No scan vault created, backend excluded");
        }
        let vaults_created = vaults.values().map(Vec::len).sum();

        let probes: Vec<DynProbe> = enabled
            .iter()
            .filter_map(|kind| self.probes.iter().find(|p| p.kind() == *kind).cloned())
            .collect();

        let runs: Vec<(DynProbe, Vec<Settled<ProbeFinding>>)> = if targets.is_empty() {
            warn!("[VulnScan] No backend has a scan vault, skipping probes");
            Vec::new()
        } else if config.concurrent_tests {
            let pending = probes
                .iter()
                .enumerate()
                .map(|(slot, probe)| self.run_probe(probe, slot, &targets, &vaults, config));
            probes.iter().cloned().zip(join_all(pending).await).collect()
        } else {
            let mut runs = Vec::with_capacity(probes.len());
            for (slot, probe) in probes.iter().enumerate() {
                let settled = self.run_probe(probe, slot, &targets, &vaults, config).await;
                runs.push((probe.clone(), settled));
            }
            runs
        };

        let mut results = Vec::new();
        let mut vulnerabilities = Vec::new();
        for (probe, settled) in runs {
            let (probe_results, vulnerability) = assess_probe(&probe, settled);
            results.extend(probe_results);
            vulnerabilities.extend(vulnerability);
        }
        for vulnerability in &vulnerabilities {
            VULNERABILITIES_FOUND
                .with_label_values(&[vulnerability.severity.as_str()])
                .inc();
        }

        let count = |status: TestStatus| results.iter().filter(|r| r.status == status).count();
        let summary = ScanSummary {
            test_name: "Vault Security Scan".to_string(),
            timestamp: Utc::now(),
            overall_status: overall_status(&results),
            passed_tests: count(TestStatus::Passed),
            failed_tests: count(TestStatus::Failed),
            warning_tests: count(TestStatus::Warning),
            skipped_tests: count(TestStatus::Skipped),
            total_tests: results.len(),
            duration_ms: started.elapsed().as_millis() as u64,
            recommendations: build_recommendations(&vulnerabilities),
            vulnerabilities,
            results,
            vaults_created,
            excluded_backends: excluded,
        };

        ENGINE_RUNS.with_label_values(&["vuln_scan"]).inc();
        info!(
            status = ?summary.overall_status,
            passed = summary.passed_tests,
            failed = summary.failed_tests,
            warnings = summary.warning_tests,
            vulnerabilities = summary.vulnerabilities.len(),
            "[VulnScan] Security scan completed in {}ms",
            summary.duration_ms
        );
        Ok(summary)
    }

    /// Connect every backend and create its timelocked scan vaults.
    async fn setup(
        &self,
        backends: &[DynBackend],
        config: &SecurityScanConfig,
    ) -> HashMap<BackendId, Vec<TestVault>> {
        let timeout = Duration::from_millis(config.test_timeout_ms);
        let connected = self
            .coordinator
            .run_across_backends(backends, timeout, |backend| async move {
                backend.connect().await
            })
            .await;

        let mut online: Vec<(DynBackend, String)> = Vec::new();
        for (backend, settled) in backends.iter().zip(connected) {
            match settled.value {
                Some(address) if settled.outcome.succeeded => online.push((backend.clone(), address)),
                _ => warn!(
                    backend = %backend.id(),
                    "[VulnScan] Connect failed: {}",
                    settled.outcome.error_message.as_deref().unwrap_or("unknown")
                ),
            }
        }

        let rounds = online.iter().map(|(backend, address)| {
            let owner = address.clone();
            let currency = backend.native_currency().to_string();
            let timelock_secs = config.vault_timelock_secs;
            self.coordinator.run_concurrent(
                backend,
                config.target_vaults,
                timeout,
                move |backend, index| {
                    let params = scan_vault(&owner, &currency, timelock_secs, index);
                    async move { backend.create_vault(params).await }
                },
            )
        });
        let created = join_all(rounds).await;

        let mut vaults: HashMap<BackendId, Vec<TestVault>> = HashMap::new();
        for ((backend, address), result) in online.iter().zip(created) {
            for settled in result {
                if !settled.outcome.succeeded {
                    warn!(
                        backend = %backend.id(),
                        "[VulnScan] Scan vault creation failed: {}",
                        settled.outcome.error_message.as_deref().unwrap_or("unknown")
                    );
                    continue;
                }
                if let Some(vault_id) = settled.value.and_then(|receipt| receipt.vault_id) {
                    vaults.entry(backend.id().clone()).or_default().push(TestVault {
                        vault_id,
                        backend_id: backend.id().clone(),
                        owner_address: address.clone(),
                        asset_amount: SCAN_VAULT_BALANCE,
                        asset_type: backend.native_currency().to_string(),
                        created_at: Utc::now(),
                    });
                }
            }
        }
        vaults
    }

    /// Fan one probe out to every target backend. Probe `slot` attacks the
    /// backend's scan vault at `slot % vault_count`.
    async fn run_probe(
        &self,
        probe: &DynProbe,
        slot: usize,
        targets: &[DynBackend],
        vaults: &HashMap<BackendId, Vec<TestVault>>,
        config: &SecurityScanConfig,
    ) -> Vec<Settled<ProbeFinding>> {
        let timeout = Duration::from_millis(config.test_timeout_ms);
        debug!(probe = %probe.kind(), "[VulnScan] Running probe");
        self.coordinator
            .run_across_backends(targets, timeout, |backend| {
                let probe = probe.clone();
                let vault = vaults
                    .get(backend.id())
                    .filter(|list| !list.is_empty())
                    .map(|list| list[slot % list.len()].clone());
                let coordinator = self.coordinator.clone();
                let max_attempts = config.max_attempts;
                let race_width = config.race_width;
                async move {
                    match vault {
                        Some(vault) => {
                            probe
                                .execute(ProbeTarget {
                                    backend,
                                    vault,
                                    coordinator,
                                    call_timeout: timeout,
                                    max_attempts,
                                    race_width,
                                })
                                .await
                        }
                        None => Ok(ProbeFinding::Skipped("No scan vault".to_string())),
                    }
                }
            })
            .await
            .into_entries()
    }
}

/// Turn settled probe runs into test results and at most one vulnerability.
fn assess_probe(
    probe: &DynProbe,
    settled: Vec<Settled<ProbeFinding>>,
) -> (Vec<TestResult>, Option<Vulnerability>) {
    let kind = probe.kind();
    let template = probe.vulnerability();
    let vulnerability_id = format!(
        "VULN-{}-{}",
        kind.id_prefix(),
        &Uuid::new_v4().simple().to_string()[..8]
    );

    let mut affected = Vec::new();
    let results: Vec<TestResult> = settled
        .into_iter()
        .map(|settled| {
            let backend_id = settled.backend_id().clone();
            let (status, details) = match (&settled.value, settled.outcome.succeeded) {
                (Some(finding), true) => match finding {
                    ProbeFinding::Secure(details) => (TestStatus::Passed, details.clone()),
                    ProbeFinding::Vulnerable(details) => {
                        affected.push(backend_id.clone());
                        (TestStatus::Failed, details.clone())
                    }
                    ProbeFinding::Suspicious(details) => (TestStatus::Warning, details.clone()),
                    ProbeFinding::Skipped(details) => (TestStatus::Skipped, details.clone()),
                },
                _ => {
                    let reason = settled
                        .outcome
                        .error_message
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string());
                    warn!(
                        backend = %backend_id,
                        probe = %kind,
                        "[VulnScan] Probe did not complete: {}",
                        reason
                    );
                    let details = if settled.outcome.is_timeout() {
                        format!("Probe timed out: {}", reason)
                    } else {
                        format!("Probe error: {}", reason)
                    };
                    (TestStatus::Warning, details)
                }
            };
            let related = if status == TestStatus::Failed {
                vec![vulnerability_id.clone()]
            } else {
                Vec::new()
            };
            TestResult {
                test_id: format!("{}-{}", kind.id_prefix(), backend_id),
                test_name: kind.test_name().to_string(),
                description: kind.description().to_string(),
                probe: kind,
                status,
                details,
                backend_id: Some(backend_id),
                component_tested: kind.component().to_string(),
                duration_ms: settled.outcome.latency_ms,
                related_vulnerability_ids: related,
            }
        })
        .collect();

    let vulnerability = (!affected.is_empty()).then(|| {
        warn!(
            probe = %kind,
            severity = template.severity.as_str(),
            backends = affected.len(),
            "[VulnScan] {} detected",
            template.name
        );
        Vulnerability {
            id: vulnerability_id,
            name: template.name.to_string(),
            description: template.description.to_string(),
            severity: template.severity,
            affected_components: vec![kind.component().to_string()],
            affected_backends: affected,
            detection_method: template.detection_method.to_string(),
            exploitation_difficulty: template.exploitation_difficulty,
            potential_impact: template.potential_impact.to_string(),
        }
    });
    (results, vulnerability)
}

fn scan_vault(owner: &str, currency: &str, timelock_secs: u64, index: usize) -> VaultCreationParams {
    VaultCreationParams {
        owner_address: owner.to_string(),
        name: format!("security-scan-{}", index),
        description: "Timelocked vault for adversarial probes".to_string(),
        timelock_secs: Some(timelock_secs),
        initial_balance: SCAN_VAULT_BALANCE,
        initial_asset_type: currency.to_string(),
        ..Default::default()
    }
}
