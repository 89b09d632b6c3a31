//! # VB-01 Backend
//!
//! The capability interface every chain integration implements, the
//! in-memory simulation backend, and the registry holding the active set.
//!
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Module Structure
//!
//! ```text
//! vb-01-backend/
//! ├── ports/       # VaultBackend, DynBackend
//! ├── adapters/    # SimulatedBackend, SimulationProfile
//! ├── events.rs    # EventHub, Subscription
//! └── registry.rs  # BackendRegistry
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod events;
pub mod ports;
pub mod registry;

// Re-exports
pub use adapters::{simulated_fleet, FaultMode, SimulatedBackend, SimulatedOp, SimulationProfile};
pub use events::{EventCallback, EventHub, Subscription};
pub use ports::{BackendResult, DynBackend, VaultBackend};
pub use registry::{BackendRegistry, RegistryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
