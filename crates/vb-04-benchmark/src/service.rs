//! # Benchmark Service
//!
//! Runs the benchmark battery against every connectable backend, scores
//! each one and ranks them.
//!
//! ## Flow
//!
//! 1. Setup: connect and warm up every backend concurrently.
//! 2. Battery: backend by backend in registration order, every enabled
//!    operation `operations_per_chain` times, sequential or in batches.
//! 3. Scoring, strengths and weaknesses per backend.
//! 4. Rankings and recommendations.

use crate::config::BenchmarkConfig;
use crate::domain::scoring::{
    assess, averages, backend_recommendations, overall_recommendations, rank, score, summarize,
};
use crate::domain::{
    BackendBenchmark, BenchmarkOperation, BenchmarkReport, OperationBenchmark, SkippedBackend,
};
use chrono::Utc;
use shared_types::{
    BackendError, ConfigError, OperationOutcome, OutcomePayload, VaultCreationParams,
};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use vb_01_backend::DynBackend;
use vb_02_fanout::{FanOutCoordinator, Settled};
use vb_telemetry::ENGINE_RUNS;

const BENCHMARK_TIMELOCK_SECS: u64 = 86_400;
const BENCHMARK_VAULT_BALANCE: f64 = 0.001;
/// Vault id used when no vault could be created for read/update/delete.
const MISSING_FIXTURE: &str = "benchmark-fixture-unavailable";

/// Benchmark and ranking engine.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkEngine {
    coordinator: FanOutCoordinator,
}

impl BenchmarkEngine {
    pub fn new(coordinator: FanOutCoordinator) -> Self {
        Self { coordinator }
    }

    /// Benchmark, score and rank `backends`.
    ///
    /// Backends that cannot connect during setup are reported in
    /// `skipped`. Individual call failures only lower scores.
    pub async fn run_benchmarks(
        &self,
        backends: &[DynBackend],
        config: &BenchmarkConfig,
    ) -> Result<BenchmarkReport, ConfigError> {
        config.validate()?;
        if backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }

        let started = Instant::now();
        info!(
            backends = backends.len(),
            operations = config.operations_per_chain,
            "[Benchmark] Starting benchmark run"
        );

        let (ready, skipped) = self.setup(backends, config).await;

        let mut per_backend = Vec::with_capacity(ready.len());
        for (index, (backend, address)) in ready.iter().enumerate() {
            if index > 0 && config.cooldown_ms > 0 {
                tokio::time::sleep(Duration::from_millis(config.cooldown_ms)).await;
            }
            per_backend.push(self.benchmark_backend(backend, address, config).await);
        }

        let rankings = rank(&per_backend);
        let (recommendations, overall) = if config.include_recommendations {
            let per: BTreeMap<_, _> = per_backend
                .iter()
                .map(|r| (r.backend_id.clone(), backend_recommendations(r)))
                .collect();
            (per, overall_recommendations(&per_backend, &rankings))
        } else {
            (BTreeMap::new(), Vec::new())
        };

        let report = BenchmarkReport {
            timestamp: Utc::now(),
            per_backend,
            rankings,
            recommendations,
            overall_recommendations: overall,
            skipped,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        ENGINE_RUNS.with_label_values(&["benchmark"]).inc();
        info!(
            scored = report.per_backend.len(),
            skipped = report.skipped.len(),
            best = ?report.rankings.best_overall,
            "[Benchmark] Run completed in {}ms",
            report.duration_ms
        );
        Ok(report)
    }

    /// Connect and warm up every backend concurrently.
    async fn setup(
        &self,
        backends: &[DynBackend],
        config: &BenchmarkConfig,
    ) -> (Vec<(DynBackend, String)>, Vec<SkippedBackend>) {
        let call_timeout = Duration::from_millis(config.timeout_ms);
        // Connect plus four calls per warm-up round, each bounded on its own.
        let setup_timeout = call_timeout * (1 + 4 * config.warmup_iterations);
        let iterations = config.warmup_iterations;

        let fan_out = self
            .coordinator
            .run_across_backends(backends, setup_timeout, move |backend| {
                connect_and_warm_up(backend, iterations, call_timeout)
            })
            .await;

        let mut ready = Vec::new();
        let mut skipped = Vec::new();
        for (backend, settled) in backends.iter().zip(fan_out) {
            match settled.value {
                Some(address) if settled.outcome.succeeded => ready.push((backend.clone(), address)),
                _ => {
                    let reason = settled
                        .outcome
                        .error_message
                        .unwrap_or_else(|| "Connection failed".to_string());
                    warn!(backend = %backend.id(), "[Benchmark] Skipping backend: {}", reason);
                    skipped.push(SkippedBackend {
                        backend_id: backend.id().clone(),
                        reason,
                    });
                }
            }
        }
        (ready, skipped)
    }

    async fn benchmark_backend(
        &self,
        backend: &DynBackend,
        address: &str,
        config: &BenchmarkConfig,
    ) -> BackendBenchmark {
        info!(backend = %backend.id(), "[Benchmark] Running battery");
        let usd_rate = config.exchange_rates.rate(backend.native_currency());
        let include = &config.include_operations;
        let total = config.operations_per_chain;
        let call_timeout = Duration::from_millis(config.timeout_ms);
        let mut operations: Vec<OperationBenchmark> = Vec::new();

        let mut vaults: Vec<String> = Vec::new();
        if include.create {
            let owner = address.to_string();
            let phase = Instant::now();
            let settled = self
                .run_operation(backend, config, move |backend, i| {
                    let params = benchmark_vault(&owner, i);
                    async move { backend.create_vault(params).await }
                })
                .await;
            operations.push(summarize(
                BenchmarkOperation::Create,
                &settled,
                phase.elapsed(),
                usd_rate,
            ));
            vaults = settled
                .iter()
                .filter_map(|s| s.success_value())
                .filter_map(|receipt| receipt.vault_id.clone())
                .collect();
        }

        let needs_vault = include.read || include.update || include.delete;
        if needs_vault && vaults.is_empty() {
            vaults.push(self.fixture_vault(backend, address, call_timeout).await);
        }
        let vaults = Arc::new(vaults);

        if include.read {
            let pool = Arc::clone(&vaults);
            let phase = Instant::now();
            let settled = self
                .run_operation(backend, config, move |backend, i| {
                    let vault_id = pool[i % pool.len()].clone();
                    async move { backend.get_vault_info(&vault_id).await }
                })
                .await;
            operations.push(summarize(
                BenchmarkOperation::Read,
                &settled,
                phase.elapsed(),
                usd_rate,
            ));
        }

        // (vault, beneficiary) pairs added by the update phase.
        let mut added: Vec<(String, String)> = Vec::new();
        if include.update {
            let pool = Arc::clone(&vaults);
            let phase = Instant::now();
            let settled = self
                .run_operation(backend, config, move |backend, i| {
                    let vault_id = pool[i % pool.len()].clone();
                    let beneficiary = beneficiary_address(i);
                    async move { backend.add_beneficiary(&vault_id, &beneficiary).await }
                })
                .await;
            operations.push(summarize(
                BenchmarkOperation::Update,
                &settled,
                phase.elapsed(),
                usd_rate,
            ));
            added = settled
                .iter()
                .enumerate()
                .filter(|(_, s)| s.succeeded())
                .map(|(i, _)| (vaults[i % vaults.len()].clone(), beneficiary_address(i)))
                .collect();
        }

        if include.delete {
            // Top up with unmeasured additions so every removal has a target.
            for i in added.len()..total {
                let vault_id = vaults[i % vaults.len()].clone();
                let beneficiary = beneficiary_address(total + i);
                let prepared =
                    tokio::time::timeout(call_timeout, backend.add_beneficiary(&vault_id, &beneficiary))
                        .await;
                if !matches!(prepared, Ok(Ok(ref receipt)) if receipt.success) {
                    debug!(backend = %backend.id(), "[Benchmark] Delete preparation failed");
                }
                added.push((vault_id, beneficiary));
            }
            let targets = Arc::new(added);
            let phase = Instant::now();
            let settled = self
                .run_operation(backend, config, move |backend, i| {
                    let (vault_id, beneficiary) = targets[i].clone();
                    async move { backend.remove_beneficiary(&vault_id, &beneficiary).await }
                })
                .await;
            operations.push(summarize(
                BenchmarkOperation::Delete,
                &settled,
                phase.elapsed(),
                usd_rate,
            ));
        }

        if include.query {
            let owner = address.to_string();
            let phase = Instant::now();
            let settled = self
                .run_operation(backend, config, move |backend, _| {
                    let owner = owner.clone();
                    async move { backend.get_balance(&owner).await }
                })
                .await;
            operations.push(summarize(
                BenchmarkOperation::Query,
                &settled,
                phase.elapsed(),
                usd_rate,
            ));
        }

        let averages = averages(&operations);
        let successes = operations.iter().map(|o| o.success_count).sum();
        let scores = score(&averages, successes);
        let (strengths, weaknesses) = assess(&scores, &operations);

        info!(
            backend = %backend.id(),
            performance = scores.performance,
            reliability = scores.reliability,
            cost = scores.cost_efficiency,
            overall = scores.overall,
            "[Benchmark] Backend scored"
        );

        BackendBenchmark {
            backend_id: backend.id().clone(),
            display_name: backend.display_name().to_string(),
            native_currency: backend.native_currency().to_string(),
            operations,
            averages,
            scores,
            strengths,
            weaknesses,
        }
    }

    /// Execute one operation kind `operations_per_chain` times, either
    /// strictly in order or in batches of `concurrent_operations`.
    async fn run_operation<T, F, Fut>(
        &self,
        backend: &DynBackend,
        config: &BenchmarkConfig,
        unit: F,
    ) -> Vec<Settled<T>>
    where
        T: OutcomePayload + Send + 'static,
        F: Fn(DynBackend, usize) -> Fut,
        Fut: Future<Output = Result<T, BackendError>> + Send + 'static,
    {
        let total = config.operations_per_chain;
        let width = config.concurrent_operations;
        let timeout = Duration::from_millis(config.timeout_ms);
        let mut settled = Vec::with_capacity(total);

        if width <= 1 {
            for i in 0..total {
                settled.push(
                    self.coordinator
                        .measure(backend.id(), timeout, unit(backend.clone(), i))
                        .await,
                );
            }
            return settled;
        }

        let mut start = 0;
        while start < total {
            let batch = width.min(total - start);
            let results = self
                .coordinator
                .run_concurrent(backend, batch, timeout, |backend, offset| {
                    unit(backend, start + offset)
                })
                .await;
            settled.extend(results);
            start += batch;
        }
        settled
    }

    /// Unmeasured vault used when the create phase produced none.
    async fn fixture_vault(&self, backend: &DynBackend, owner: &str, timeout: Duration) -> String {
        let created = tokio::time::timeout(timeout, backend.create_vault(benchmark_vault(owner, 0))).await;
        match created {
            Ok(Ok(receipt)) if receipt.success => match receipt.vault_id {
                Some(vault_id) => return vault_id,
                None => warn!(backend = %backend.id(), "[Benchmark] Fixture receipt has no vault id"),
            },
            Ok(Ok(receipt)) => warn!(
                backend = %backend.id(),
                "[Benchmark] Fixture vault rejected: {}",
                receipt.error_message.unwrap_or_default()
            ),
            Ok(Err(err)) => warn!(backend = %backend.id(), "[Benchmark] Fixture vault failed: {}", err),
            Err(_) => warn!(backend = %backend.id(), "[Benchmark] Fixture vault timed out"),
        }
        MISSING_FIXTURE.to_string()
    }
}

/// Connect, then run warm-up rounds whose failures are only logged.
async fn connect_and_warm_up(
    backend: DynBackend,
    iterations: u32,
    call_timeout: Duration,
) -> Result<String, BackendError> {
    let address = match tokio::time::timeout(call_timeout, backend.connect()).await {
        Ok(result) => result?,
        Err(_) => return Err(BackendError::Timeout(call_timeout.as_millis() as u64)),
    };

    for round in 0..iterations {
        let result = tokio::time::timeout(call_timeout, warm_up_round(&backend, &address, round)).await;
        let outcome = match result {
            Ok(result) => OperationOutcome::from_result(backend.id().clone(), 0, &result),
            Err(_) => OperationOutcome::timed_out(backend.id().clone(), call_timeout.as_millis() as u64),
        };
        if !outcome.succeeded {
            warn!(
                backend = %backend.id(),
                round,
                "[Benchmark] Warm-up failed: {}",
                outcome.error_message.as_deref().unwrap_or("unknown")
            );
        }
    }
    Ok(address)
}

async fn warm_up_round(backend: &DynBackend, address: &str, round: u32) -> Result<(), BackendError> {
    backend.get_balance(address).await?;
    let receipt = backend
        .create_vault(benchmark_vault(address, round as usize))
        .await?;
    if !receipt.success {
        return Err(BackendError::Rejected(
            receipt
                .error_message
                .unwrap_or_else(|| "Warm-up vault rejected".to_string()),
        ));
    }
    if let Some(vault_id) = receipt.vault_id {
        backend.get_vault_info(&vault_id).await?;
    }
    Ok(())
}

fn benchmark_vault(owner: &str, index: usize) -> VaultCreationParams {
    VaultCreationParams {
        owner_address: owner.to_string(),
        name: format!("Benchmark Vault {}", index),
        description: "Vault created for benchmarking".to_string(),
        timelock_secs: Some(BENCHMARK_TIMELOCK_SECS),
        initial_balance: BENCHMARK_VAULT_BALANCE,
        ..Default::default()
    }
}

fn beneficiary_address(index: usize) -> String {
    format!("bench-beneficiary-{}", index)
}
