//! # Consistency Verification Service
//!
//! Checks whether a logical vault replicated across N backends is intact on
//! each of them and mutually consistent.
//!
//! ## Flow
//!
//! 1. Fan out integrity verification plus a vault read to every backend.
//! 2. Require at least one intact response.
//! 3. Compare enabled fields against the first successful backend.
//! 4. Score: `0.6 × success ratio + 0.4 × passed-field ratio`, in percent.
//! 5. Derive recommended actions.

use crate::config::ConsistencyConfig;
use crate::domain::{
    BackendVerification, ConsistencyField, ConsistencyReport, FieldConsistency, Inconsistency,
    InconsistencySeverity, VaultSnapshot,
};
use crate::error::{ConsistencyError, ConsistencyResult};
use chrono::Utc;
use shared_types::{round_score, BackendError, ConfigError, VaultInfo};
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use vb_01_backend::DynBackend;
use vb_02_fanout::FanOutCoordinator;
use vb_telemetry::ENGINE_RUNS;

/// Consistency verification engine.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyVerifier {
    coordinator: FanOutCoordinator,
    config: ConsistencyConfig,
}

impl ConsistencyVerifier {
    pub fn new(config: ConsistencyConfig) -> Self {
        Self {
            coordinator: FanOutCoordinator::default(),
            config,
        }
    }

    /// Use a specific coordinator (e.g. one with an overall deadline).
    pub fn with_coordinator(mut self, coordinator: FanOutCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn config(&self) -> &ConsistencyConfig {
        &self.config
    }

    /// Verify `vault_id` on every backend and compare the results.
    ///
    /// Fails only when the configuration is invalid or no backend returned
    /// an intact verification.
    pub async fn verify_across_backends(
        &self,
        vault_id: &str,
        backends: &[DynBackend],
    ) -> ConsistencyResult<ConsistencyReport> {
        self.config.validate()?;
        if backends.is_empty() {
            return Err(ConfigError::NoBackends.into());
        }

        let started = Instant::now();
        info!(
            vault_id,
            backends = backends.len(),
            "[Consistency] Starting verification"
        );

        let names: HashMap<_, _> = backends
            .iter()
            .map(|b| (b.id().clone(), b.display_name().to_string()))
            .collect();
        let max_retries = self.config.max_retries;
        let vault = vault_id.to_string();
        let fan_out = self
            .coordinator
            .run_across_backends(
                backends,
                Duration::from_millis(self.config.timeout_ms),
                move |backend| fetch_snapshot(backend, vault.clone(), max_retries),
            )
            .await;

        let backend_results: Vec<BackendVerification> = fan_out
            .into_iter()
            .map(|settled| {
                let outcome = settled.outcome;
                let (integrity, vault_info) = match settled.value {
                    Some(snapshot) => (Some(snapshot.integrity), Some(snapshot.info)),
                    None => (None, None),
                };
                if !outcome.succeeded {
                    warn!(
                        backend = %outcome.backend_id,
                        vault_id,
                        "[Consistency] Verification failed: {}",
                        outcome.error_message.as_deref().unwrap_or("unknown")
                    );
                }
                BackendVerification {
                    display_name: names
                        .get(&outcome.backend_id)
                        .cloned()
                        .unwrap_or_else(|| outcome.backend_id.to_string()),
                    backend_id: outcome.backend_id,
                    succeeded: outcome.succeeded,
                    response_time_ms: outcome.latency_ms,
                    integrity,
                    vault_info,
                    error_code: outcome.error_code,
                    error_message: outcome.error_message,
                }
            })
            .collect();

        let successful = backend_results.iter().filter(|r| r.succeeded).count();
        if successful == 0 {
            warn!(vault_id, "[Consistency] Vault unverifiable on every backend");
            return Err(ConsistencyError::NoBackendReachable {
                vault_id: vault_id.to_string(),
                attempted: backend_results.len(),
            });
        }

        let mut recommended_actions = Vec::new();
        let verification_success =
            if self.config.require_all_backends && successful < backend_results.len() {
                recommended_actions.push("Investigate failed backend verifications".to_string());
                false
            } else {
                true
            };

        let (data_consistency, inconsistencies) = self.analyze_fields(&backend_results);
        let consistency_score = self.score(successful, backend_results.len(), &data_consistency);
        recommended_actions.extend(self.recommendations(
            &backend_results,
            &inconsistencies,
            consistency_score,
        ));

        let report = ConsistencyReport {
            vault_id: vault_id.to_string(),
            timestamp: Utc::now(),
            verification_success,
            backend_results,
            consistency_score,
            data_consistency,
            inconsistencies,
            recommended_actions,
            execution_time_ms: started.elapsed().as_millis() as u64,
        };

        ENGINE_RUNS.with_label_values(&["consistency"]).inc();
        info!(
            vault_id,
            score = report.consistency_score,
            success = report.verification_success,
            "[Consistency] Verification completed in {}ms",
            report.execution_time_ms
        );
        Ok(report)
    }

    /// Compare every enabled field of the successful backends against the
    /// first successful backend.
    fn analyze_fields(
        &self,
        results: &[BackendVerification],
    ) -> (FieldConsistency, Vec<Inconsistency>) {
        let mut flags = FieldConsistency::default();
        let mut inconsistencies = Vec::new();

        let views: Vec<(&BackendVerification, &VaultInfo)> = results
            .iter()
            .filter(|r| r.succeeded)
            .filter_map(|r| r.vault_info.as_ref().map(|info| (r, info)))
            .collect();
        let Some(((_, reference), others)) = views.split_first() else {
            return (flags, inconsistencies);
        };
        if others.is_empty() {
            return (flags, inconsistencies);
        }

        for field in ConsistencyField::ALL {
            if !self.is_enabled(field) {
                continue;
            }
            let affected: Vec<_> = others
                .iter()
                .filter(|(_, info)| !fields_match(field, reference, info))
                .map(|(result, _)| result.backend_id.clone())
                .collect();
            if affected.is_empty() {
                continue;
            }

            debug!(%field, affected = affected.len(), "[Consistency] Field mismatch");
            flags.set(field, false);
            let (severity, description, possible_cause) = describe(field);
            inconsistencies.push(Inconsistency {
                field,
                severity,
                affected_backends: affected,
                description: description.to_string(),
                possible_cause: possible_cause.to_string(),
            });
        }

        (flags, inconsistencies)
    }

    fn is_enabled(&self, field: ConsistencyField) -> bool {
        let checks = &self.config.consistency_checks;
        match field {
            ConsistencyField::Owner => checks.owner,
            ConsistencyField::Beneficiaries => checks.beneficiaries,
            ConsistencyField::Balance => checks.balance,
            ConsistencyField::Status => checks.status,
            ConsistencyField::Metadata => checks.metadata,
        }
    }

    fn score(&self, successful: usize, total: usize, flags: &FieldConsistency) -> u8 {
        let success_ratio = successful as f64 / total as f64;
        let enabled = self.config.consistency_checks.enabled_count();
        let field_factor = if enabled == 0 {
            1.0
        } else {
            let passed = ConsistencyField::ALL
                .iter()
                .filter(|f| self.is_enabled(**f) && flags.get(**f))
                .count();
            passed as f64 / enabled as f64
        };
        round_score((success_ratio * 0.6 + field_factor * 0.4) * 100.0)
    }

    fn recommendations(
        &self,
        results: &[BackendVerification],
        inconsistencies: &[Inconsistency],
        score: u8,
    ) -> Vec<String> {
        let mut actions = Vec::new();

        let failed: Vec<String> = results
            .iter()
            .filter(|r| !r.succeeded)
            .map(backend_label)
            .collect();
        if !failed.is_empty() {
            actions.push(format!(
                "Verify vault integrity on failed backends: {}",
                failed.join(", ")
            ));
        }

        if !inconsistencies.is_empty() {
            let fields_with = |severity: InconsistencySeverity| -> Vec<&str> {
                inconsistencies
                    .iter()
                    .filter(|i| i.severity == severity)
                    .map(|i| i.field.as_str())
                    .collect()
            };
            let critical = fields_with(InconsistencySeverity::Critical);
            if !critical.is_empty() {
                actions.push(format!(
                    "URGENT: Address critical inconsistencies: {}",
                    critical.join(", ")
                ));
            }
            let high = fields_with(InconsistencySeverity::High);
            if !high.is_empty() {
                actions.push(format!(
                    "Address high severity inconsistencies: {}",
                    high.join(", ")
                ));
            }
            actions.push(
                "Initiate cross-backend synchronization to resolve data inconsistencies"
                    .to_string(),
            );
        }

        let slow: Vec<String> = results
            .iter()
            .filter(|r| r.response_time_ms > self.config.slow_response_ms)
            .map(backend_label)
            .collect();
        if !slow.is_empty() {
            actions.push(format!(
                "Investigate slow response times on: {}",
                slow.join(", ")
            ));
        }

        if score < 60 {
            actions.push(
                "Low consistency score: Consider rebuilding cross-backend verification or vault recovery"
                    .to_string(),
            );
        } else if score < 80 {
            actions.push(
                "Moderate consistency issues: Schedule cross-backend synchronization".to_string(),
            );
        }

        actions
    }
}

/// Display names repeat across backends; the id disambiguates.
fn backend_label(result: &BackendVerification) -> String {
    format!("{} ({})", result.display_name, result.backend_id)
}

/// Integrity check followed by a vault read, retried on backend errors.
async fn fetch_snapshot(
    backend: DynBackend,
    vault_id: String,
    max_retries: u32,
) -> Result<VaultSnapshot, BackendError> {
    let mut attempt = 0;
    loop {
        let result = async {
            let integrity = backend.verify_vault_integrity(&vault_id).await?;
            let info = backend.get_vault_info(&vault_id).await?;
            Ok::<_, BackendError>(VaultSnapshot { integrity, info })
        }
        .await;

        match result {
            Ok(snapshot) => return Ok(snapshot),
            Err(err) if attempt < max_retries => {
                attempt += 1;
                debug!(
                    backend = %backend.id(),
                    attempt,
                    "[Consistency] Retrying after error: {}",
                    err
                );
            }
            Err(err) => return Err(err),
        }
    }
}

fn fields_match(field: ConsistencyField, a: &VaultInfo, b: &VaultInfo) -> bool {
    match field {
        ConsistencyField::Owner => a.owner.eq_ignore_ascii_case(&b.owner),
        ConsistencyField::Beneficiaries => {
            let set = |info: &VaultInfo| -> BTreeSet<String> {
                info.beneficiaries.iter().map(|b| b.to_lowercase()).collect()
            };
            set(a) == set(b)
        }
        ConsistencyField::Balance => {
            (a.balance - b.balance).abs() <= f64::EPSILON * a.balance.abs().max(1.0)
                && a.asset_type == b.asset_type
        }
        ConsistencyField::Status => a.status == b.status,
        ConsistencyField::Metadata => a.metadata == b.metadata,
    }
}

fn describe(field: ConsistencyField) -> (InconsistencySeverity, &'static str, &'static str) {
    match field {
        ConsistencyField::Owner => (
            InconsistencySeverity::High,
            "Owner address is inconsistent across backends",
            "Cross-backend sync failure or potential ownership manipulation",
        ),
        ConsistencyField::Beneficiaries => (
            InconsistencySeverity::High,
            "Beneficiary set differs across backends",
            "Beneficiary change not propagated to every backend",
        ),
        ConsistencyField::Balance => (
            InconsistencySeverity::High,
            "Locked balance or asset type differs across backends",
            "Lock or unlock confirmed on a subset of backends",
        ),
        ConsistencyField::Status => (
            InconsistencySeverity::High,
            "Vault status differs across backends",
            "Lifecycle transition not propagated",
        ),
        ConsistencyField::Metadata => (
            InconsistencySeverity::Medium,
            "Vault metadata differs across backends",
            "Metadata update applied on a subset of backends",
        ),
    }
}
