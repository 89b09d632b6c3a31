//! # Load Generation Service
//!
//! Drives a weighted random workload against every backend that received
//! test vaults, until a wall-clock deadline.
//!
//! ## Phases
//!
//! 1. Setup: connect every backend, then create `vaults_per_chain` vaults
//!    on each, all concurrently.
//! 2. Steady state: `concurrent_transactions` workers loop until
//!    `start + test_duration_secs`, each with its own tally.
//! 3. Aggregation: tallies are merged, then throughput and latency
//!    percentiles are computed.

use crate::config::{LoadConfig, TransactionDistribution};
use crate::domain::{LoadOperation, LoadPhase, LoadTally, LoadTestResult};
use chrono::Utc;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;
use shared_types::{
    mean, BackendId, ConfigError, ErrorCode, LatencyPercentiles, MultiSigOperation,
    OperationOutcome, TestVault, VaultCreationParams,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use vb_01_backend::DynBackend;
use vb_02_fanout::{FanOutCoordinator, Settled};
use vb_telemetry::{CallTimer, ENGINE_RUNS, LOAD_OPERATIONS};

const LOAD_VAULT_BALANCE: f64 = 0.1;

/// Concurrent load generator.
#[derive(Debug, Clone, Default)]
pub struct LoadGenerator {
    coordinator: FanOutCoordinator,
}

/// Read-only state shared by every worker.
struct WorkerContext {
    coordinator: FanOutCoordinator,
    pool: Arc<Vec<TestVault>>,
    backends: HashMap<BackendId, DynBackend>,
    /// Backends owning at least one pool vault.
    peers: Vec<BackendId>,
    distribution: TransactionDistribution,
    operation_timeout: Duration,
    max_jitter_ms: u64,
    pacing: Option<Duration>,
    deadline: Instant,
}

impl LoadGenerator {
    pub fn new(coordinator: FanOutCoordinator) -> Self {
        Self { coordinator }
    }

    /// Run the load test and aggregate every recorded operation.
    ///
    /// Returns a setup-only report when no test vault could be created.
    pub async fn run_concurrency_test(
        &self,
        backends: &[DynBackend],
        config: &LoadConfig,
    ) -> Result<LoadTestResult, ConfigError> {
        config.validate()?;
        if backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }

        let started = Instant::now();
        let deadline = started + Duration::from_secs(config.test_duration_secs);
        info!(
            workers = config.concurrent_transactions,
            duration_secs = config.test_duration_secs,
            backends = backends.len(),
            "[LoadGen] Starting load test"
        );

        let mut tally = LoadTally::new();
        for backend in backends {
            tally.track(backend.id());
        }

        let pool = self.setup(backends, config, &mut tally).await;
        let with_vaults: HashSet<&BackendId> = pool.iter().map(|v| &v.backend_id).collect();
        let excluded: Vec<BackendId> = backends
            .iter()
            .map(|b| b.id().clone())
            .filter(|id| !with_vaults.contains(id))
            .collect();
        for id in &excluded {
            warn!(backend = %id, "[LoadGen] No test vaults created, backend excluded");
        }
        info!(
            vaults = pool.len(),
            backends = with_vaults.len(),
            "[LoadGen] Setup completed"
        );

        let vaults_created = pool.len();
        if pool.is_empty() {
            warn!("[LoadGen] No test vaults available, skipping steady state");
        } else {
            let peers: Vec<BackendId> = backends
                .iter()
                .map(|b| b.id().clone())
                .filter(|id| with_vaults.contains(id))
                .collect();
            let context = Arc::new(WorkerContext {
                coordinator: self.coordinator.clone(),
                backends: backends
                    .iter()
                    .filter(|b| with_vaults.contains(b.id()))
                    .map(|b| (b.id().clone(), b.clone()))
                    .collect(),
                pool: Arc::new(pool),
                peers,
                distribution: config.transaction_distribution.clone(),
                operation_timeout: Duration::from_millis(config.operation_timeout_ms),
                max_jitter_ms: config.max_jitter_ms,
                pacing: config.pacing_interval()?,
                deadline,
            });

            let workers: Vec<_> = (0..config.concurrent_transactions)
                .map(|worker| tokio::spawn(run_worker(worker, Arc::clone(&context))))
                .collect();
            for (worker, handle) in workers.into_iter().enumerate() {
                match handle.await {
                    Ok(worker_tally) => tally.merge(worker_tally),
                    Err(err) => warn!(worker, "[LoadGen] Worker aborted: {}", err),
                }
            }
        }

        let elapsed = started.elapsed();
        let mut latencies = std::mem::take(&mut tally.latencies);
        let average_latency_ms = mean(&latencies);
        let percentiles = LatencyPercentiles::from_samples(&mut latencies);
        let seconds = elapsed.as_secs_f64();

        let result = LoadTestResult {
            total_operations: tally.total,
            succeeded: tally.succeeded,
            failed: tally.failed,
            per_backend: tally.per_backend,
            average_latency_ms,
            percentiles,
            throughput_ops: if seconds > 0.0 {
                tally.total as f64 / seconds
            } else {
                0.0
            },
            elapsed_ms: elapsed.as_millis() as u64,
            vaults_created,
            excluded_backends: excluded,
            errors: tally.errors,
        };

        ENGINE_RUNS.with_label_values(&["load"]).inc();
        info!(
            total = result.total_operations,
            failed = result.failed,
            tps = result.throughput_ops,
            p99_ms = result.percentiles.p99,
            "[LoadGen] Load test completed in {}ms",
            result.elapsed_ms
        );
        Ok(result)
    }

    /// Connect every backend and create its test vaults.
    async fn setup(
        &self,
        backends: &[DynBackend],
        config: &LoadConfig,
        tally: &mut LoadTally,
    ) -> Vec<TestVault> {
        let timeout = Duration::from_millis(config.setup_timeout_ms);
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
                _ => {
                    warn!(
                        backend = %backend.id(),
                        "[LoadGen] Connect failed: {}",
                        settled.outcome.error_message.as_deref().unwrap_or("unknown")
                    );
                    // Every planned vault of this backend counts as a failed creation.
                    for _ in 0..config.vaults_per_chain {
                        tally.record(&settled.outcome, false, LoadOperation::Create, LoadPhase::Setup, None);
                    }
                }
            }
        }

        let rounds = online.iter().map(|(backend, address)| {
            let owner = address.clone();
            let currency = backend.native_currency().to_string();
            self.coordinator.run_concurrent(
                backend,
                config.vaults_per_chain,
                timeout,
                move |backend, index| {
                    let params = load_vault(&owner, &currency, index);
                    async move { backend.create_vault(params).await }
                },
            )
        });
        let created = join_all(rounds).await;

        let mut pool = Vec::new();
        for ((backend, address), result) in online.iter().zip(created) {
            for settled in result {
                let returned = settled.value.is_some();
                let mut outcome = settled.outcome;
                if outcome.error_code == Some(ErrorCode::TxFailed) {
                    outcome.error_code = Some(ErrorCode::CreationFailed);
                }
                tally.record(&outcome, returned, LoadOperation::Create, LoadPhase::Setup, None);

                let vault_id = settled
                    .value
                    .filter(|_| outcome.succeeded)
                    .and_then(|receipt| receipt.vault_id);
                if let Some(vault_id) = vault_id {
                    pool.push(TestVault {
                        vault_id,
                        backend_id: backend.id().clone(),
                        owner_address: address.clone(),
                        asset_amount: LOAD_VAULT_BALANCE,
                        asset_type: backend.native_currency().to_string(),
                        created_at: Utc::now(),
                    });
                }
            }
        }
        pool
    }
}

/// Loop until the deadline, picking and executing weighted operations.
async fn run_worker(worker: usize, context: Arc<WorkerContext>) -> LoadTally {
    let mut rng = StdRng::from_entropy();
    let mut tally = LoadTally::new();

    loop {
        let iteration = Instant::now();
        let remaining = context.deadline.saturating_duration_since(iteration);
        if remaining.is_zero() {
            break;
        }

        let picked = context.distribution.pick(rng.gen_range(0..100));
        let vault = &context.pool[rng.gen_range(0..context.pool.len())];
        let Some(backend) = context.backends.get(&vault.backend_id) else {
            continue;
        };
        let target = if picked == LoadOperation::CrossChain {
            let others: Vec<&BackendId> = context
                .peers
                .iter()
                .filter(|peer| **peer != vault.backend_id)
                .collect();
            others.choose(&mut rng).map(|peer| (*peer).clone())
        } else {
            None
        };
        let operation = match (picked, &target) {
            (LoadOperation::CrossChain, None) => LoadOperation::Verify,
            _ => picked,
        };
        let request = Request {
            operation,
            target,
            lock_amount: rng.gen_range(0.001..0.1),
            beneficiary: format!("0x{:016x}", rng.gen::<u64>()),
            timeout: context.operation_timeout.min(remaining),
        };

        let (outcome, returned) = {
            let _timer = CallTimer::start(operation.as_str());
            execute(&context.coordinator, backend, vault, request).await
        };
        LOAD_OPERATIONS
            .with_label_values(&[operation.as_str(), outcome_label(&outcome)])
            .inc();
        tally.record(
            &outcome,
            returned,
            operation,
            LoadPhase::SteadyState,
            Some(&vault.vault_id),
        );

        if context.max_jitter_ms > 0 {
            let jitter = Duration::from_millis(rng.gen_range(0..context.max_jitter_ms));
            tokio::time::sleep_until((Instant::now() + jitter).min(context.deadline)).await;
        }
        if let Some(interval) = context.pacing {
            tokio::time::sleep_until((iteration + interval).min(context.deadline)).await;
        }
    }

    debug!(worker, operations = tally.total, "[LoadGen] Worker finished");
    tally
}

struct Request {
    operation: LoadOperation,
    target: Option<BackendId>,
    lock_amount: f64,
    beneficiary: String,
    timeout: Duration,
}

async fn execute(
    coordinator: &FanOutCoordinator,
    backend: &DynBackend,
    vault: &TestVault,
    request: Request,
) -> (OperationOutcome, bool) {
    let id = backend.id();
    let vault_id = vault.vault_id.as_str();
    let timeout = request.timeout;
    match request.operation {
        LoadOperation::Create => {
            let params = load_vault(&vault.owner_address, &vault.asset_type, 0);
            settle(coordinator.measure(id, timeout, backend.create_vault(params)).await)
        }
        LoadOperation::Lock => settle(
            coordinator
                .measure(
                    id,
                    timeout,
                    backend.lock_assets(vault_id, request.lock_amount, &vault.asset_type),
                )
                .await,
        ),
        LoadOperation::Unlock => {
            settle(coordinator.measure(id, timeout, backend.unlock_assets(vault_id)).await)
        }
        LoadOperation::MultiSig => {
            let params = json!({ "beneficiary_address": request.beneficiary });
            settle(
                coordinator
                    .measure(
                        id,
                        timeout,
                        backend.create_multisig_request(
                            vault_id,
                            MultiSigOperation::AddBeneficiary,
                            params,
                        ),
                    )
                    .await,
            )
        }
        LoadOperation::CrossChain => match request.target {
            Some(target) => settle(
                coordinator
                    .measure(id, timeout, backend.initiate_vault_sync(vault_id, &target))
                    .await,
            ),
            None => settle(
                coordinator
                    .measure(id, timeout, backend.verify_vault_integrity(vault_id))
                    .await,
            ),
        },
        LoadOperation::Verify => settle(
            coordinator
                .measure(id, timeout, backend.verify_vault_integrity(vault_id))
                .await,
        ),
    }
}

fn settle<T>(settled: Settled<T>) -> (OperationOutcome, bool) {
    let returned = settled.value.is_some();
    (settled.outcome, returned)
}

fn outcome_label(outcome: &OperationOutcome) -> &'static str {
    if outcome.succeeded {
        "success"
    } else if outcome.is_timeout() {
        "timeout"
    } else {
        "failure"
    }
}

fn load_vault(owner: &str, asset_type: &str, index: usize) -> VaultCreationParams {
    VaultCreationParams {
        owner_address: owner.to_string(),
        name: format!("Load Test Vault {}-{}", Utc::now().timestamp_millis(), index),
        description: "Auto-generated vault for load testing".to_string(),
        cross_chain_enabled: true,
        initial_balance: LOAD_VAULT_BALANCE,
        initial_asset_type: asset_type.to_string(),
        ..Default::default()
    }
}
