//! # Environment Provisioning
//!
//! Builds a populated test environment: wallets spread across backends by
//! percentage and vaults carrying simulated USD values. High-value vaults
//! hold a token native balance and only record their simulated value.

pub mod config;
pub mod provisioner;

pub use config::{EnvironmentConfig, SecurityLevelDistribution};
pub use provisioner::{
    allocate_wallets, EnvironmentProvisioner, ProvisionedEnvironment, ProvisionedVault,
    TestWallet,
};
