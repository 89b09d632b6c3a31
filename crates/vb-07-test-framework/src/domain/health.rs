//! # Overall Health
//!
//! | Score | Source | Formula |
//! |-------|--------|---------|
//! | reliability | load | `round(success_rate × 100)` |
//! | performance | load | `clamp(round(100 − p99_ms / 50))` |
//! | security | scan | `clamp(round(pass_rate × 100 − 20·critical − 10·high − 2·count))` |
//! | robustness | both | mean of the scores whose sub-run executed |

use serde::{Deserialize, Serialize};
use shared_types::round_score;
use vb_05_load::LoadTestResult;
use vb_06_vuln_scan::{ScanSummary, Severity};

const FAILURE_RATE_WARNING: f64 = 0.05;
const BACKEND_FAILURE_RATE_WARNING: f64 = 0.10;
const SLOW_P95_MS: u64 = 1_000;

/// Health scores, 0-100. `None` when the sub-run feeding a score did not
/// execute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallHealth {
    pub reliability: Option<u8>,
    pub security: Option<u8>,
    pub performance: Option<u8>,
    pub robustness: Option<u8>,
}

pub fn compute_health(load: Option<&LoadTestResult>, scan: Option<&ScanSummary>) -> OverallHealth {
    let mut health = OverallHealth::default();

    if let Some(load) = load {
        health.reliability = Some(round_score(load.success_rate() * 100.0));
        health.performance = Some(round_score(100.0 - load.percentiles.p99 as f64 / 50.0));
    }

    if let Some(scan) = scan {
        let critical = scan.count_severity(Severity::Critical) as f64;
        let high = scan.count_severity(Severity::High) as f64;
        let count = scan.vulnerabilities.len() as f64;
        let score = scan.pass_rate() * 100.0 - critical * 20.0 - high * 10.0 - count * 2.0;
        health.security = Some(round_score(score));
    }

    let executed: Vec<f64> = [health.reliability, health.security, health.performance]
        .into_iter()
        .flatten()
        .map(f64::from)
        .collect();
    if !executed.is_empty() {
        health.robustness = Some(round_score(
            executed.iter().sum::<f64>() / executed.len() as f64,
        ));
    }
    health
}

/// Consolidated, tagged recommendations.
pub fn build_recommendations(
    load: Option<&LoadTestResult>,
    scan: Option<&ScanSummary>,
) -> Vec<String> {
    let mut recommendations: Vec<String> = scan
        .map(|scan| {
            scan.recommendations
                .iter()
                .map(|rec| format!("[SECURITY] {}: {}", rec.title, rec.description))
                .collect()
        })
        .unwrap_or_default();

    if let Some(load) = load {
        if load.failure_rate() > FAILURE_RATE_WARNING {
            recommendations.push(
                "[RELIABILITY] High transaction failure rate detected. Consider optimizing transaction processing and error handling.".to_string(),
            );
        }
        if load.percentiles.p95 > SLOW_P95_MS {
            recommendations.push(
                "[PERFORMANCE] Slow response times detected (p95 > 1000ms). Consider optimizing transaction processing and database queries.".to_string(),
            );
        }
        for (backend_id, stats) in &load.per_backend {
            if stats.failure_rate() > BACKEND_FAILURE_RATE_WARNING {
                recommendations.push(format!(
                    "[BACKEND] High failure rate on {}. Consider investigating network conditions or optimizing this specific integration.",
                    backend_id
                ));
            }
        }
    }

    if recommendations.is_empty() {
        recommendations.push(
            "[GENERAL] Consider implementing regular automated testing to continuously monitor system health.".to_string(),
        );
        recommendations.push(
            "[GENERAL] Implement detailed performance monitoring across all backends to identify bottlenecks early.".to_string(),
        );
    }
    recommendations
}
