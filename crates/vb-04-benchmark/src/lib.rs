//! # VB-04 Benchmark & Ranking
//!
//! Measures create/read/update/delete/query operations on every backend,
//! scores performance, reliability and cost, and ranks the backends.
//!
//! ## Scores
//!
//! | Score | Formula |
//! |-------|---------|
//! | performance | `0.6 × speed + 0.4 × min(100, tps × 10)`, 0 without successes |
//! | reliability | success rate in percent |
//! | cost efficiency | `100 − (avg USD cost − 0.01) × 100` |
//! | overall | `0.4 × performance + 0.4 × reliability + 0.2 × cost` |
//!
//! All scores are clamped to `[0, 100]`. Rankings break ties in favor of
//! the first-registered backend.

#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod service;

pub use config::{BenchmarkConfig, IncludeOperations};
pub use domain::{
    BackendAverages, BackendBenchmark, BenchmarkOperation, BenchmarkReport, BenchmarkScores,
    OperationBenchmark, Rankings, SkippedBackend,
};
pub use service::BenchmarkEngine;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
