//! # Backend Capability Interface
//!
//! The uniform surface every chain-family integration implements. Engines
//! only ever see `DynBackend` values; whether a backend talks to a live chain
//! or to an in-memory ledger is invisible to them.

use crate::events::{EventCallback, Subscription};
use async_trait::async_trait;
use serde_json::Value;
use shared_types::{
    Address, BackendError, BackendId, CapabilityProfile, ChainFamily, EventKind, IntegrityReport,
    MultiSigOperation, MultiSigStatus, TransactionReceipt, VaultCreationParams, VaultInfo,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Result alias for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Shared handle to a backend.
pub type DynBackend = Arc<dyn VaultBackend>;

/// Capability interface of one chain-family backend.
///
/// Every call is fallible and may be slow. Callers bound each call with a
/// timeout; an elapsed timeout is treated like an explicit error.
#[async_trait]
pub trait VaultBackend: Send + Sync {
    // =========================================================================
    // Identity
    // =========================================================================

    /// Stable backend id.
    fn id(&self) -> &BackendId;

    /// Human-readable name.
    fn display_name(&self) -> &str;

    /// Whether the backend targets a test network.
    fn is_test_mode(&self) -> bool;

    /// Chain family of the backend.
    fn chain_family(&self) -> ChainFamily;

    /// Native currency symbol (e.g. `ETH`).
    fn native_currency(&self) -> &str;

    // =========================================================================
    // Session
    // =========================================================================

    /// Open a session and return the session address.
    async fn connect(&self) -> BackendResult<Address>;

    /// Close the session.
    async fn disconnect(&self) -> BackendResult<()>;

    /// Whether a session is open.
    fn is_connected(&self) -> bool;

    /// Session address, if connected.
    fn address(&self) -> Option<Address>;

    /// Native balance of `address`.
    async fn get_balance(&self, address: &str) -> BackendResult<f64>;

    // =========================================================================
    // Vault lifecycle
    // =========================================================================

    async fn create_vault(&self, params: VaultCreationParams) -> BackendResult<TransactionReceipt>;

    async fn get_vault_info(&self, vault_id: &str) -> BackendResult<VaultInfo>;

    async fn lock_assets(
        &self,
        vault_id: &str,
        amount: f64,
        asset_type: &str,
    ) -> BackendResult<TransactionReceipt>;

    async fn unlock_assets(&self, vault_id: &str) -> BackendResult<TransactionReceipt>;

    async fn add_beneficiary(
        &self,
        vault_id: &str,
        beneficiary: &str,
    ) -> BackendResult<TransactionReceipt>;

    async fn remove_beneficiary(
        &self,
        vault_id: &str,
        beneficiary: &str,
    ) -> BackendResult<TransactionReceipt>;

    // =========================================================================
    // Integrity and signing
    // =========================================================================

    async fn verify_vault_integrity(&self, vault_id: &str) -> BackendResult<IntegrityReport>;

    /// Sign `message` with the session key.
    async fn sign_message(&self, message: &str) -> BackendResult<String>;

    /// Check `signature` over `message` for `address`.
    async fn verify_signature(
        &self,
        message: &str,
        signature: &str,
        address: &str,
    ) -> BackendResult<bool>;

    // =========================================================================
    // Multi-sig
    // =========================================================================

    /// Open a multi-sig request and return its id.
    async fn create_multisig_request(
        &self,
        vault_id: &str,
        operation: MultiSigOperation,
        params: Value,
    ) -> BackendResult<String>;

    /// Approve a request as the session signer.
    async fn approve_multisig_request(&self, request_id: &str)
        -> BackendResult<TransactionReceipt>;

    async fn get_multisig_status(&self, request_id: &str) -> BackendResult<MultiSigStatus>;

    // =========================================================================
    // Cross-chain
    // =========================================================================

    /// Start synchronizing a vault to `target`.
    async fn initiate_vault_sync(
        &self,
        vault_id: &str,
        target: &BackendId,
    ) -> BackendResult<TransactionReceipt>;

    /// Integrity of the vault as seen by this backend and its sync peers.
    async fn verify_vault_across_chains(
        &self,
        vault_id: &str,
    ) -> BackendResult<HashMap<BackendId, IntegrityReport>>;

    // =========================================================================
    // Introspection and events
    // =========================================================================

    fn capability_profile(&self) -> CapabilityProfile;

    /// Register `callback` for events of `kind`. Dropping the returned
    /// handle cancels the subscription.
    fn subscribe(&self, kind: EventKind, callback: EventCallback) -> Subscription;
}
