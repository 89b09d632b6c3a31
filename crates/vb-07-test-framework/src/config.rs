//! Comprehensive run configuration.

use crate::error::FrameworkResult;
use crate::provisioning::EnvironmentConfig;
use serde::{Deserialize, Serialize};
use shared_types::BackendId;
use vb_05_load::LoadConfig;
use vb_06_vuln_scan::SecurityScanConfig;

/// Sub-runs of `TestFramework::run_comprehensive`. A missing section skips
/// that sub-run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    pub load: Option<LoadConfig>,
    pub security: Option<SecurityScanConfig>,
    pub environment: Option<EnvironmentConfig>,
    /// Restrict the run to these backends, in this order. `None` uses every
    /// registered backend.
    pub backends: Option<Vec<BackendId>>,
}

impl FrameworkConfig {
    /// Parse and validate a complete JSON configuration.
    pub fn from_json(json: &str) -> FrameworkResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every present section.
    pub fn validate(&self) -> FrameworkResult<()> {
        if let Some(load) = &self.load {
            load.validate()?;
        }
        if let Some(security) = &self.security {
            security.validate()?;
        }
        if let Some(environment) = &self.environment {
            environment.validate()?;
        }
        Ok(())
    }
}
