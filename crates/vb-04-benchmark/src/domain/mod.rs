//! Domain types and scoring rules of the benchmark engine.

pub mod results;
pub mod scoring;

pub use results::{
    BackendAverages, BackendBenchmark, BenchmarkOperation, BenchmarkReport, BenchmarkScores,
    OperationBenchmark, Rankings, SkippedBackend,
};
