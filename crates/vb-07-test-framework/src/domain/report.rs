//! Result of a comprehensive run.

use super::health::OverallHealth;
use crate::provisioning::ProvisionedEnvironment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::BackendId;
use vb_05_load::LoadTestResult;
use vb_06_vuln_scan::ScanSummary;
use vb_telemetry::DeploymentEnvironment;

/// Where the run took place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestingEnvironment {
    pub backends: Vec<BackendId>,
    /// At least one backend targets a test network.
    pub any_test_mode: bool,
    pub environment: DeploymentEnvironment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveReport {
    pub timestamp: DateTime<Utc>,
    pub testing_environment: TestingEnvironment,
    pub load: Option<LoadTestResult>,
    pub security: Option<ScanSummary>,
    pub environment: Option<ProvisionedEnvironment>,
    pub health: OverallHealth,
    pub recommendations: Vec<String>,
    pub duration_ms: u64,
}

/// Production only when declared and some backend is live; staging when
/// declared or when any backend is live; development otherwise.
pub fn determine_environment(
    declared: Option<DeploymentEnvironment>,
    all_test_mode: bool,
) -> DeploymentEnvironment {
    match declared {
        Some(DeploymentEnvironment::Production) if !all_test_mode => {
            DeploymentEnvironment::Production
        }
        Some(DeploymentEnvironment::Staging) => DeploymentEnvironment::Staging,
        _ if !all_test_mode => DeploymentEnvironment::Staging,
        _ => DeploymentEnvironment::Development,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_resolution() {
        use DeploymentEnvironment::*;
        assert_eq!(determine_environment(Some(Production), false), Production);
        assert_eq!(determine_environment(Some(Production), true), Development);
        assert_eq!(determine_environment(Some(Staging), true), Staging);
        assert_eq!(determine_environment(None, false), Staging);
        assert_eq!(determine_environment(None, true), Development);
        assert_eq!(determine_environment(Some(Development), false), Staging);
    }
}
