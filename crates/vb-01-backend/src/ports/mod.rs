//! # Ports
//!
//! The capability interface engines program against.

pub mod capability;

pub use capability::{BackendResult, DynBackend, VaultBackend};
