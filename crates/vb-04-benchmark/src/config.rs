//! Benchmark configuration.

use serde::{Deserialize, Serialize};
use shared_types::{ensure_positive, ConfigError, ExchangeRates};

/// Operations executed by the battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeOperations {
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
    pub query: bool,
}

impl Default for IncludeOperations {
    fn default() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
            delete: true,
            query: true,
        }
    }
}

impl IncludeOperations {
    pub fn any(&self) -> bool {
        self.create || self.read || self.update || self.delete || self.query
    }
}

/// Benchmark engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Executions of every enabled operation per backend.
    pub operations_per_chain: usize,
    pub include_operations: IncludeOperations,
    /// Batch width; 1 runs strictly sequentially.
    pub concurrent_operations: usize,
    pub warmup_iterations: u32,
    /// Pause between two backends' batteries.
    pub cooldown_ms: u64,
    /// Bound on a single backend call.
    pub timeout_ms: u64,
    pub include_recommendations: bool,
    pub exchange_rates: ExchangeRates,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            operations_per_chain: 10,
            include_operations: IncludeOperations::default(),
            concurrent_operations: 1,
            warmup_iterations: 1,
            cooldown_ms: 1_000,
            timeout_ms: 30_000,
            include_recommendations: true,
            exchange_rates: ExchangeRates::default(),
        }
    }
}

impl BenchmarkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("operations_per_chain", self.operations_per_chain as u64)?;
        ensure_positive("concurrent_operations", self.concurrent_operations as u64)?;
        ensure_positive("timeout_ms", self.timeout_ms)?;
        if !self.include_operations.any() {
            return Err(ConfigError::OutOfRange {
                field: "include_operations",
                value: "none".to_string(),
                expected: "at least one enabled operation",
            });
        }
        self.exchange_rates.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(BenchmarkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_no_operations_rejected() {
        let config = BenchmarkConfig {
            include_operations: IncludeOperations {
                create: false,
                read: false,
                update: false,
                delete: false,
                query: false,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "include_operations", .. })
        ));
    }

    #[test]
    fn test_zero_width_rejected() {
        let config = BenchmarkConfig {
            concurrent_operations: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroValue {
                field: "concurrent_operations"
            })
        );
    }
}
