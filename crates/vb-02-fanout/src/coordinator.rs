//! # Fan-Out Coordinator
//!
//! Runs one unit of work per backend as independent tokio tasks and waits
//! for all of them to settle. A failing, hanging or panicking task only
//! produces a failed outcome for its own backend.

use serde::{Deserialize, Serialize};
use shared_types::{BackendError, BackendId, ErrorCode, OperationOutcome, OutcomePayload};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};
use vb_01_backend::DynBackend;
use vb_telemetry::{BACKEND_CALL_DURATION, FANOUT_TASKS};

/// Coordinator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanOutConfig {
    /// Upper bound on a whole fan-out call. Tasks still running when it
    /// elapses are aborted and reported as `DEADLINE_EXCEEDED`.
    pub overall_deadline_ms: Option<u64>,
}

/// One settled unit of work: its outcome plus the typed value, if the call
/// returned one.
#[derive(Debug, Clone)]
pub struct Settled<T> {
    pub outcome: OperationOutcome,
    pub value: Option<T>,
}

impl<T> Settled<T> {
    pub fn backend_id(&self) -> &BackendId {
        &self.outcome.backend_id
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.succeeded
    }

    /// The value of a successful call.
    pub fn success_value(&self) -> Option<&T> {
        if self.outcome.succeeded {
            self.value.as_ref()
        } else {
            None
        }
    }
}

/// Settled units in submission order.
#[derive(Debug, Clone)]
pub struct FanOutResult<T> {
    entries: Vec<Settled<T>>,
}

impl<T> FanOutResult<T> {
    /// First entry for `backend_id`.
    pub fn get(&self, backend_id: &BackendId) -> Option<&Settled<T>> {
        self.entries.iter().find(|s| s.backend_id() == backend_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Settled<T>> {
        self.entries.iter()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &OperationOutcome> {
        self.entries.iter().map(|s| &s.outcome)
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|s| s.succeeded()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<Settled<T>> {
        self.entries
    }
}

impl<T> IntoIterator for FanOutResult<T> {
    type Item = Settled<T>;
    type IntoIter = std::vec::IntoIter<Settled<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Shared concurrency primitive of every engine.
#[derive(Debug, Clone, Default)]
pub struct FanOutCoordinator {
    config: FanOutConfig,
}

impl FanOutCoordinator {
    pub fn new(config: FanOutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FanOutConfig {
        &self.config
    }

    /// Run `unit(backend)` for every backend concurrently, each bounded by
    /// `timeout`. Returns once every task has settled.
    pub async fn run_across_backends<T, F, Fut>(
        &self,
        backends: &[DynBackend],
        timeout: Duration,
        unit: F,
    ) -> FanOutResult<T>
    where
        T: OutcomePayload + Send + 'static,
        F: Fn(DynBackend) -> Fut,
        Fut: Future<Output = Result<T, BackendError>> + Send + 'static,
    {
        debug!(
            "[FanOut] Dispatching to {} backends (timeout {}ms)",
            backends.len(),
            timeout.as_millis()
        );
        let tasks = backends
            .iter()
            .map(|backend| {
                let id = backend.id().clone();
                let fut = unit(backend.clone());
                (id.clone(), spawn_bounded(id, timeout, fut))
            })
            .collect();
        self.settle_all(tasks).await
    }

    /// Run `width` units against one backend concurrently with the same
    /// isolation guarantees. Entries are ordered by unit index.
    pub async fn run_concurrent<T, F, Fut>(
        &self,
        backend: &DynBackend,
        width: usize,
        timeout: Duration,
        unit: F,
    ) -> FanOutResult<T>
    where
        T: OutcomePayload + Send + 'static,
        F: Fn(DynBackend, usize) -> Fut,
        Fut: Future<Output = Result<T, BackendError>> + Send + 'static,
    {
        let id = backend.id().clone();
        let tasks = (0..width)
            .map(|index| {
                let fut = unit(backend.clone(), index);
                (id.clone(), spawn_bounded(id.clone(), timeout, fut))
            })
            .collect();
        self.settle_all(tasks).await
    }

    /// Settle a single call inline, bounded by `timeout`.
    pub async fn measure<T, Fut>(
        &self,
        backend_id: &BackendId,
        timeout: Duration,
        fut: Fut,
    ) -> Settled<T>
    where
        T: OutcomePayload,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let settled = run_bounded(backend_id.clone(), timeout, fut).await;
        record(&settled.outcome);
        settled
    }

    async fn settle_all<T>(&self, tasks: Vec<(BackendId, JoinHandle<Settled<T>>)>) -> FanOutResult<T> {
        let started = Instant::now();
        let deadline = self
            .config
            .overall_deadline_ms
            .map(|ms| tokio::time::Instant::from_std(started) + Duration::from_millis(ms));

        let mut entries = Vec::with_capacity(tasks.len());
        for (backend_id, mut handle) in tasks {
            let joined = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, &mut handle).await {
                    Ok(joined) => Some(joined),
                    Err(_) => {
                        handle.abort();
                        None
                    }
                },
                None => Some(handle.await),
            };

            let settled = match joined {
                Some(Ok(settled)) => settled,
                Some(Err(err)) => panicked(backend_id, started, err),
                None => {
                    let elapsed = started.elapsed().as_millis() as u64;
                    warn!(backend = %backend_id, "[FanOut] Overall deadline exceeded, task aborted");
                    Settled {
                        outcome: OperationOutcome::failed(
                            backend_id,
                            elapsed,
                            ErrorCode::DeadlineExceeded,
                            format!(
                                "Overall deadline of {}ms exceeded",
                                self.config.overall_deadline_ms.unwrap_or_default()
                            ),
                        ),
                        value: None,
                    }
                }
            };
            record(&settled.outcome);
            entries.push(settled);
        }

        FanOutResult { entries }
    }
}

fn spawn_bounded<T, Fut>(backend_id: BackendId, timeout: Duration, fut: Fut) -> JoinHandle<Settled<T>>
where
    T: OutcomePayload + Send + 'static,
    Fut: Future<Output = Result<T, BackendError>> + Send + 'static,
{
    tokio::spawn(run_bounded(backend_id, timeout, fut))
}

async fn run_bounded<T, Fut>(backend_id: BackendId, timeout: Duration, fut: Fut) -> Settled<T>
where
    T: OutcomePayload,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let start = Instant::now();
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => {
            let latency_ms = start.elapsed().as_millis() as u64;
            BACKEND_CALL_DURATION
                .with_label_values(&["fan_out"])
                .observe(latency_ms as f64 / 1000.0);
            let outcome = OperationOutcome::from_result(backend_id, latency_ms, &result);
            Settled {
                outcome,
                value: result.ok(),
            }
        }
        Err(_) => Settled {
            outcome: OperationOutcome::timed_out(backend_id, timeout.as_millis() as u64),
            value: None,
        },
    }
}

fn panicked<T>(backend_id: BackendId, started: Instant, err: JoinError) -> Settled<T> {
    let message = if err.is_panic() {
        "Task panicked".to_string()
    } else {
        format!("Task cancelled: {}", err)
    };
    warn!(backend = %backend_id, "[FanOut] {}", message);
    Settled {
        outcome: OperationOutcome::failed(
            backend_id,
            started.elapsed().as_millis() as u64,
            ErrorCode::Exception,
            message,
        ),
        value: None,
    }
}

fn record(outcome: &OperationOutcome) {
    let label = match outcome.error_code {
        None if outcome.succeeded => "success",
        Some(ErrorCode::Timeout) => "timeout",
        Some(ErrorCode::DeadlineExceeded) => "deadline",
        _ => "failure",
    };
    FANOUT_TASKS.with_label_values(&[label]).inc();
    if !outcome.succeeded {
        debug!(
            backend = %outcome.backend_id,
            code = ?outcome.error_code,
            "[FanOut] Task failed: {}",
            outcome.error_message.as_deref().unwrap_or("unknown")
        );
    }
}
