//! # Probes
//!
//! Built-in adversarial checks, one module per probe kind.

pub mod access_control;
pub mod cross_chain;
pub mod front_running;
pub mod race_condition;
pub mod replay;
pub mod rpc_manipulation;
pub mod signature_forging;

pub use access_control::AccessControlProbe;
pub use cross_chain::CrossChainProbe;
pub use front_running::FrontRunningProbe;
pub use race_condition::RaceConditionProbe;
pub use replay::ReplayProbe;
pub use rpc_manipulation::RpcManipulationProbe;
pub use signature_forging::SignatureForgingProbe;

use crate::domain::ProbeKind;
use crate::ports::DynProbe;
use shared_types::{BackendError, TransactionReceipt};
use std::sync::Arc;

/// Built-in probe for `kind`.
pub fn probe_for(kind: ProbeKind) -> DynProbe {
    match kind {
        ProbeKind::Replay => Arc::new(ReplayProbe),
        ProbeKind::FrontRunning => Arc::new(FrontRunningProbe),
        ProbeKind::AccessControlBypass => Arc::new(AccessControlProbe),
        ProbeKind::SignatureForging => Arc::new(SignatureForgingProbe),
        ProbeKind::RaceConditions => Arc::new(RaceConditionProbe),
        ProbeKind::CrossChain => Arc::new(CrossChainProbe),
        ProbeKind::RpcManipulation => Arc::new(RpcManipulationProbe),
    }
}

/// Treat a rejected receipt of a setup call as a failed call.
pub(crate) fn require_accepted(receipt: TransactionReceipt) -> Result<TransactionReceipt, BackendError> {
    if receipt.success {
        Ok(receipt)
    } else {
        Err(BackendError::Rejected(
            receipt
                .error_message
                .unwrap_or_else(|| "Transaction rejected".to_string()),
        ))
    }
}
