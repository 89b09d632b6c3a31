//! # Probe Interface
//!
//! A probe performs one adversarial check against one backend and returns a
//! verdict. Probes never panic on backend misbehavior: an error on an attack
//! call means the backend refused it, and setup calls that keep failing
//! produce `ProbeFinding::Skipped`.

use crate::domain::{ExploitationDifficulty, ProbeKind, Severity};
use async_trait::async_trait;
use serde::Serialize;
use shared_types::{BackendError, OutcomePayload, TestVault};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use vb_01_backend::DynBackend;
use vb_02_fanout::FanOutCoordinator;

/// Shared handle to a probe.
pub type DynProbe = Arc<dyn Probe>;

/// Everything a probe needs to attack one backend.
#[derive(Clone)]
pub struct ProbeTarget {
    pub backend: DynBackend,
    /// Timelocked scan vault owned by `backend`.
    pub vault: TestVault,
    pub coordinator: FanOutCoordinator,
    /// Bound on concurrent sub-calls issued by the probe.
    pub call_timeout: Duration,
    pub max_attempts: u32,
    pub race_width: usize,
}

/// Verdict of one probe run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "details", rename_all = "lowercase")]
pub enum ProbeFinding {
    /// The attack was refused.
    Secure(String),
    /// The attack succeeded.
    Vulnerable(String),
    /// Anomalous but not exploitable behavior.
    Suspicious(String),
    /// A setup call failed on every attempt.
    Skipped(String),
}

impl ProbeFinding {
    pub fn details(&self) -> &str {
        match self {
            ProbeFinding::Secure(details)
            | ProbeFinding::Vulnerable(details)
            | ProbeFinding::Suspicious(details)
            | ProbeFinding::Skipped(details) => details,
        }
    }
}

impl OutcomePayload for ProbeFinding {}

/// Static description of the vulnerability a probe reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VulnerabilityTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub detection_method: &'static str,
    pub exploitation_difficulty: ExploitationDifficulty,
    pub potential_impact: &'static str,
}

/// One adversarial check.
#[async_trait]
pub trait Probe: Send + Sync {
    fn kind(&self) -> ProbeKind;

    /// Vulnerability reported when `execute` returns `Vulnerable`.
    fn vulnerability(&self) -> VulnerabilityTemplate;

    /// Attack `target.backend`. An `Err` is an unexpected probe failure.
    async fn execute(&self, target: ProbeTarget) -> Result<ProbeFinding, BackendError>;
}

/// Run a setup call up to `max_attempts` times, returning the last error.
pub async fn retry<T, F, Fut>(max_attempts: u32, mut call: F) -> Result<T, BackendError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt = 0;
    loop {
        match call(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 >= max_attempts.max(1) => return Err(err),
            Err(err) => {
                debug!(attempt, "[VulnScan] Setup call failed, retrying: {}", err);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_stops_on_success() {
        let calls = AtomicU32::new(0);
        let result = retry(3, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 1 {
                    Err(BackendError::Network("flaky".to_string()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry(3, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(BackendError::Network(format!("attempt {}", attempt))) }
        })
        .await;
        assert_eq!(result, Err(BackendError::Network("attempt 2".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_finding_serializes_with_verdict_tag() {
        let value = serde_json::to_value(ProbeFinding::Vulnerable("x".to_string())).unwrap();
        assert_eq!(value["verdict"], "vulnerable");
        assert_eq!(value["details"], "x");
    }
}
