//! # Scoring Rules
//!
//! Pure functions turning settled calls into measurements, scores,
//! rankings and recommendations. Every value here is derived only from the
//! outcomes of the current run.

use super::results::{
    BackendAverages, BackendBenchmark, BenchmarkOperation, BenchmarkScores, OperationBenchmark,
    Rankings,
};
use shared_types::{clamp_score, mean, round_score, BackendId, LatencyPercentiles};
use std::time::Duration;
use vb_02_fanout::Settled;

const READ_FAST_MS: f64 = 200.0;
const WRITE_SLOW_MS: f64 = 5_000.0;
const CREATE_P99_SLOW_MS: u64 = 5_000;
const PERFORMANCE_GAP: u8 = 30;

/// Summarize the settled calls of one operation kind.
///
/// Latency is sampled for every call that returned, business rejections
/// included. Cost is averaged over successful calls that reported a fee.
pub fn summarize<T>(
    operation: BenchmarkOperation,
    settled: &[Settled<T>],
    elapsed: Duration,
    usd_rate: f64,
) -> OperationBenchmark {
    let total_ops = settled.len();
    let success_count = settled.iter().filter(|s| s.succeeded()).count();

    let mut latencies: Vec<u64> = settled
        .iter()
        .filter(|s| s.value.is_some())
        .map(|s| s.outcome.latency_ms)
        .collect();
    let avg_latency_ms = mean(&latencies);
    let percentiles = LatencyPercentiles::from_samples(&mut latencies);

    let costs: Vec<f64> = settled
        .iter()
        .filter(|s| s.succeeded())
        .filter_map(|s| s.outcome.cost_native)
        .collect();
    let avg_cost_native = if costs.is_empty() {
        0.0
    } else {
        costs.iter().sum::<f64>() / costs.len() as f64
    };

    let seconds = elapsed.as_secs_f64();
    let throughput_tps = if seconds > 0.0 {
        total_ops as f64 / seconds
    } else {
        0.0
    };

    OperationBenchmark {
        operation,
        total_ops,
        success_count,
        fail_count: total_ops - success_count,
        avg_latency_ms,
        p50_latency_ms: percentiles.p50,
        p90_latency_ms: percentiles.p90,
        p99_latency_ms: percentiles.p99,
        avg_cost_native,
        avg_cost_usd: avg_cost_native * usd_rate,
        throughput_tps,
    }
}

/// Confirmation time and cost weighted by op count, overall success rate
/// and mean throughput.
pub fn averages(operations: &[OperationBenchmark]) -> BackendAverages {
    let total: usize = operations.iter().map(|o| o.total_ops).sum();
    if total == 0 {
        return BackendAverages::default();
    }
    let weighted = |f: fn(&OperationBenchmark) -> f64| -> f64 {
        operations
            .iter()
            .map(|o| f(o) * o.total_ops as f64)
            .sum::<f64>()
            / total as f64
    };
    let successes: usize = operations.iter().map(|o| o.success_count).sum();

    BackendAverages {
        confirmation_time_ms: weighted(|o| o.avg_latency_ms),
        cost_usd: weighted(|o| o.avg_cost_usd),
        success_rate: successes as f64 / total as f64 * 100.0,
        throughput_tps: operations.iter().map(|o| o.throughput_tps).sum::<f64>()
            / operations.len() as f64,
    }
}

/// Performance, reliability, cost efficiency and their weighted overall.
pub fn score(averages: &BackendAverages, successes: usize) -> BenchmarkScores {
    let performance = if successes == 0 {
        0.0
    } else {
        let speed = clamp_score(100.0 - (averages.confirmation_time_ms - 1_000.0) / 90.0);
        let throughput = clamp_score(averages.throughput_tps * 10.0);
        speed * 0.6 + throughput * 0.4
    };
    let reliability = clamp_score(averages.success_rate);
    let cost_efficiency = clamp_score(100.0 - (averages.cost_usd - 0.01) * 100.0);
    let overall = performance * 0.4 + reliability * 0.4 + cost_efficiency * 0.2;

    BenchmarkScores {
        performance: round_score(performance),
        reliability: round_score(reliability),
        cost_efficiency: round_score(cost_efficiency),
        overall: round_score(overall),
    }
}

/// Strengths and weaknesses derived from scores and per-operation latency.
pub fn assess(
    scores: &BenchmarkScores,
    operations: &[OperationBenchmark],
) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if scores.performance >= 90 {
        strengths.push("Excellent transaction speed and throughput");
    } else if scores.performance >= 70 {
        strengths.push("Good transaction speed and throughput");
    } else if scores.performance < 50 {
        weaknesses.push("Slow transaction processing");
    }

    if scores.reliability >= 98 {
        strengths.push("Extremely reliable with nearly 100% success rate");
    } else if scores.reliability >= 90 {
        strengths.push("Very reliable with high success rate");
    } else if scores.reliability < 80 {
        weaknesses.push("Reliability issues with significant failure rate");
    }

    if scores.cost_efficiency >= 90 {
        strengths.push("Very cost-effective with low transaction fees");
    } else if scores.cost_efficiency >= 70 {
        strengths.push("Reasonable transaction costs");
    } else if scores.cost_efficiency < 50 {
        weaknesses.push("High transaction costs");
    }

    let find = |op| operations.iter().find(|o| o.operation == op);
    if let Some(read) = find(BenchmarkOperation::Read) {
        if read.avg_latency_ms < READ_FAST_MS && read.success_count > 0 {
            strengths.push("Extremely fast read operations");
        }
    }
    if let Some(create) = find(BenchmarkOperation::Create) {
        if create.avg_latency_ms > WRITE_SLOW_MS {
            weaknesses.push("Slow write operations");
        }
    }

    (
        strengths.into_iter().map(String::from).collect(),
        weaknesses.into_iter().map(String::from).collect(),
    )
}

/// Argmax per score. Strict comparison keeps the first-registered backend
/// on ties.
pub fn rank(results: &[BackendBenchmark]) -> Rankings {
    let best = |key: fn(&BenchmarkScores) -> u8| -> Option<BackendId> {
        let mut best: Option<&BackendBenchmark> = None;
        for result in results {
            match best {
                Some(current) if key(&result.scores) <= key(&current.scores) => {}
                _ => best = Some(result),
            }
        }
        best.map(|b| b.backend_id.clone())
    };

    Rankings {
        fastest: best(|s| s.performance),
        most_reliable: best(|s| s.reliability),
        most_cost_effective: best(|s| s.cost_efficiency),
        best_overall: best(|s| s.overall),
    }
}

/// Recommendations for a single backend.
pub fn backend_recommendations(result: &BackendBenchmark) -> Vec<String> {
    let mut recommendations = Vec::new();
    if result.scores.performance < 60 {
        recommendations.push("Consider optimizing transaction batching for better performance");
        recommendations.push("Use this chain for non-time-sensitive operations");
    }
    if result.scores.reliability < 90 {
        recommendations.push("Implement robust retry mechanisms for failed transactions");
        recommendations.push("Consider additional validation before submitting transactions");
    }
    if result.scores.cost_efficiency < 70 {
        recommendations.push("Consider using this chain only for high-value transactions");
        recommendations.push("Explore gas optimization techniques");
    }
    if let Some(create) = result.operation(BenchmarkOperation::Create) {
        if create.p99_latency_ms > CREATE_P99_SLOW_MS {
            recommendations.push(
                "Implement progressive UI for vault creation to handle occasional long delays",
            );
        }
    }
    recommendations.into_iter().map(String::from).collect()
}

/// Cross-backend recommendations from the rankings.
pub fn overall_recommendations(results: &[BackendBenchmark], rankings: &Rankings) -> Vec<String> {
    let name = |id: &Option<BackendId>| -> Option<&str> {
        let id = id.as_ref()?;
        results
            .iter()
            .find(|r| &r.backend_id == id)
            .map(|r| r.display_name.as_str())
    };

    let mut recommendations = Vec::new();
    if let Some(fastest) = name(&rankings.fastest) {
        recommendations.push(format!(
            "Use {} for time-sensitive operations like real-time updates and quick responses",
            fastest
        ));
    }
    if let Some(reliable) = name(&rankings.most_reliable) {
        recommendations.push(format!(
            "Use {} for mission-critical operations where reliability is paramount",
            reliable
        ));
    }
    if let Some(cheapest) = name(&rankings.most_cost_effective) {
        recommendations.push(format!(
            "Use {} for frequent operations and microtransactions to minimize fees",
            cheapest
        ));
    }
    if let Some(best) = name(&rankings.best_overall) {
        recommendations.push(format!(
            "Use {} as the default chain for balanced performance, reliability, and cost",
            best
        ));
    }

    let performance = results.iter().map(|r| r.scores.performance);
    if let (Some(max), Some(min)) = (performance.clone().max(), performance.min()) {
        if max - min > PERFORMANCE_GAP {
            recommendations.push(
                "Consider a chain-specific optimization strategy due to significant performance differences between chains"
                    .to_string(),
            );
        }
    }
    recommendations
}
