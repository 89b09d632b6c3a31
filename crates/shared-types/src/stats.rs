//! # Aggregation Helpers
//!
//! Percentiles and score clamping shared by every engine.

use serde::{Deserialize, Serialize};

/// Value at percentile `pct` of an ascending-sorted slice.
///
/// Index rule: `ceil(pct / 100 * n) - 1`, clamped into the slice. Empty
/// input yields 0.
pub fn percentile(sorted: &[u64], pct: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[index]
}

/// Arithmetic mean, 0 for empty input.
pub fn mean(samples: &[u64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<u64>() as f64 / samples.len() as f64
}

/// Clamp a score into `[0, 100]`. NaN maps to 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Clamp and round a score to an integer in `[0, 100]`.
pub fn round_score(value: f64) -> u8 {
    clamp_score(value).round() as u8
}

/// Latency distribution summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyPercentiles {
    pub p50: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
}

impl LatencyPercentiles {
    /// Sort `samples` in place and compute the percentiles.
    pub fn from_samples(samples: &mut [u64]) -> Self {
        samples.sort_unstable();
        Self {
            p50: percentile(samples, 50.0),
            p90: percentile(samples, 90.0),
            p95: percentile(samples, 95.0),
            p99: percentile(samples, 99.0),
        }
    }
}
