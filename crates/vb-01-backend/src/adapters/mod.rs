//! # Adapters
//!
//! `VaultBackend` implementations shipped with the crate.

pub mod simulated;

pub use simulated::{simulated_fleet, FaultMode, SimulatedBackend, SimulatedOp, SimulationProfile};
