//! # Core Domain Entities
//!
//! Vault-side entities exchanged with backends.
//!
//! ## Clusters
//!
//! - **Identity**: `BackendId`, `ChainFamily`, `CapabilityProfile`
//! - **Vaults**: `VaultCreationParams`, `VaultInfo`, `TestVault`
//! - **Transactions**: `TransactionReceipt`, multi-sig requests
//! - **Integrity**: `IntegrityReport`, `SecurityAlert`
//! - **Events**: `EventKind`, `BackendEvent`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A chain address. Formats differ per chain family, so it stays textual.
pub type Address = String;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Stable identifier of a registered backend (e.g. `"ethereum"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BackendId(pub String);

impl BackendId {
    /// Create a backend id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BackendId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Chain family a backend belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainFamily {
    /// EVM-like account chains (Ethereum, Arbitrum, Polygon).
    Evm,
    /// Non-EVM account-model chains (Solana, TON).
    AccountModel,
    /// UTXO chains (Bitcoin).
    Utxo,
}

/// Coarse throughput class advertised by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThroughputClass {
    Low,
    Medium,
    High,
}

/// Coarse fee class advertised by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostClass {
    Low,
    Medium,
    High,
}

/// Coarse security class advertised by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityClass {
    Standard,
    Enhanced,
    Maximum,
}

/// Introspection result of `VaultBackend::capability_profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    pub throughput_class: ThroughputClass,
    pub cost_class: CostClass,
    pub security_class: SecurityClass,
    pub special_capabilities: Vec<String>,
}

impl CapabilityProfile {
    /// Default profile for a chain family.
    pub fn for_family(family: ChainFamily) -> Self {
        match family {
            ChainFamily::Evm => Self {
                throughput_class: ThroughputClass::Medium,
                cost_class: CostClass::High,
                security_class: SecurityClass::Maximum,
                special_capabilities: vec!["smart-contracts".into(), "multi-sig".into()],
            },
            ChainFamily::AccountModel => Self {
                throughput_class: ThroughputClass::High,
                cost_class: CostClass::Low,
                security_class: SecurityClass::Enhanced,
                special_capabilities: vec!["parallel-execution".into()],
            },
            ChainFamily::Utxo => Self {
                throughput_class: ThroughputClass::Low,
                cost_class: CostClass::Medium,
                security_class: SecurityClass::Maximum,
                special_capabilities: vec!["timelock-scripts".into()],
            },
        }
    }
}

// =============================================================================
// CLUSTER B: VAULTS
// =============================================================================

/// Security level requested at vault creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityLevel {
    #[default]
    Standard,
    Enhanced,
    Maximum,
}

/// Lifecycle status of a vault as reported by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultStatus {
    #[default]
    Active,
    Locked,
    Unlocked,
    Closed,
}

/// Parameters for `VaultBackend::create_vault`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultCreationParams {
    pub owner_address: Address,
    pub name: String,
    pub description: String,
    /// Seconds from creation until assets may be unlocked.
    pub timelock_secs: Option<u64>,
    pub security_level: SecurityLevel,
    pub cross_chain_enabled: bool,
    pub initial_balance: f64,
    pub initial_asset_type: String,
    pub beneficiaries: Vec<Address>,
    pub metadata: BTreeMap<String, String>,
}

/// A backend's view of one vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultInfo {
    pub vault_id: String,
    pub owner: Address,
    pub beneficiaries: Vec<Address>,
    pub balance: f64,
    pub asset_type: String,
    pub status: VaultStatus,
    pub unlock_at: Option<DateTime<Utc>>,
    pub metadata: BTreeMap<String, String>,
}

/// A vault created on one backend to drive synthetic operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVault {
    pub vault_id: String,
    pub backend_id: BackendId,
    pub owner_address: Address,
    pub asset_amount: f64,
    pub asset_type: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// CLUSTER C: TRANSACTIONS
// =============================================================================

/// Result of a state-changing backend call.
///
/// `success = false` is a business rejection reported by the backend
/// (e.g. unlock before timelock), not a transport error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub success: bool,
    pub tx_hash: String,
    /// Fee paid in the backend's native currency.
    pub fee_native: Option<f64>,
    pub error_message: Option<String>,
    /// Set by `create_vault` when a vault was created.
    pub vault_id: Option<String>,
}

impl TransactionReceipt {
    /// Accepted transaction.
    pub fn accepted(tx_hash: impl Into<String>, fee_native: Option<f64>) -> Self {
        Self {
            success: true,
            tx_hash: tx_hash.into(),
            fee_native,
            error_message: None,
            vault_id: None,
        }
    }

    /// Transaction rejected by the backend's business rules.
    pub fn rejected(tx_hash: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            tx_hash: tx_hash.into(),
            fee_native: None,
            error_message: Some(message.into()),
            vault_id: None,
        }
    }

    /// Attach the created vault id.
    pub fn with_vault(mut self, vault_id: impl Into<String>) -> Self {
        self.vault_id = Some(vault_id.into());
        self
    }
}

/// Operation a multi-sig request authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiSigOperation {
    AddBeneficiary,
    RemoveBeneficiary,
    Unlock,
    Sync,
}

/// State of a multi-sig request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiSigState {
    Pending,
    Approved,
    Rejected,
    Executed,
}

/// Status returned by `VaultBackend::get_multisig_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSigStatus {
    pub request_id: String,
    pub vault_id: String,
    pub operation: MultiSigOperation,
    pub state: MultiSigState,
    /// One entry per recorded approval, including duplicates.
    pub approvals: Vec<Address>,
    pub required_approvals: u32,
}

// =============================================================================
// CLUSTER D: INTEGRITY
// =============================================================================

/// Severity of an integrity alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

/// Alert raised by a backend during integrity verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub level: AlertLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of `VaultBackend::verify_vault_integrity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub is_intact: bool,
    /// 0-100.
    pub integrity_score: u8,
    pub signatures: Vec<String>,
    pub alerts: Vec<SecurityAlert>,
    pub last_verified: DateTime<Utc>,
    pub cross_chain_confirmations: u32,
}

impl IntegrityReport {
    /// An intact report with full score.
    pub fn intact(signatures: Vec<String>) -> Self {
        Self {
            is_intact: true,
            integrity_score: 100,
            signatures,
            alerts: Vec::new(),
            last_verified: Utc::now(),
            cross_chain_confirmations: 0,
        }
    }

    /// A compromised report carrying one critical alert.
    pub fn compromised(message: impl Into<String>) -> Self {
        Self {
            is_intact: false,
            integrity_score: 0,
            signatures: Vec::new(),
            alerts: vec![SecurityAlert {
                level: AlertLevel::Critical,
                message: message.into(),
                timestamp: Utc::now(),
            }],
            last_verified: Utc::now(),
            cross_chain_confirmations: 0,
        }
    }
}

// =============================================================================
// CLUSTER E: EVENTS
// =============================================================================

/// Event categories a subscriber can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    VaultCreated,
    AssetsLocked,
    AssetsUnlocked,
    BeneficiaryChanged,
    MultiSigApproved,
    SyncInitiated,
}

/// Event published by a backend to its subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendEvent {
    pub kind: EventKind,
    pub backend_id: BackendId,
    pub vault_id: String,
    pub tx_hash: Option<String>,
    pub timestamp: DateTime<Utc>,
}
