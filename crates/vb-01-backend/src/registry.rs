//! # Backend Registry
//!
//! Holds the active set of backends for a test run.
//!
//! ## Features
//!
//! - **Hot add/remove**: backends can be registered or dropped between runs
//! - **Stable order**: `all()` returns registration order, which engines use
//!   as the ranking tie-break
//! - **Explicit instance**: constructed and injected, never global
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = Arc::new(BackendRegistry::new());
//! registry.register(Arc::new(SimulatedBackend::new("ethereum", SimulationProfile::ethereum())));
//!
//! let framework = TestFramework::new(Arc::clone(&registry));
//! ```

use crate::ports::DynBackend;
use parking_lot::RwLock;
use shared_types::BackendId;
use thiserror::Error;
use tracing::{info, warn};
use vb_telemetry::REGISTERED_BACKENDS;

/// Registry lookup failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No backend registered under this id.
    #[error("Unknown backend: {0}")]
    UnknownBackend(BackendId),
}

/// Ordered set of registered backends.
#[derive(Default)]
pub struct BackendRegistry {
    backends: RwLock<Vec<DynBackend>>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend.
    ///
    /// An existing backend with the same id is replaced in place and keeps
    /// its registration position. Returns `true` if a backend was replaced.
    pub fn register(&self, backend: DynBackend) -> bool {
        let id = backend.id().clone();
        info!(
            "[Registry] Registering backend {} ({})",
            id,
            backend.display_name()
        );

        let mut backends = self.backends.write();
        let replaced = match backends.iter().position(|b| *b.id() == id) {
            Some(index) => {
                warn!("[Registry] Backend {} already registered, replacing", id);
                backends[index] = backend;
                true
            }
            None => {
                backends.push(backend);
                false
            }
        };
        REGISTERED_BACKENDS.set(backends.len() as f64);
        replaced
    }

    /// Remove a backend, returning it if it was registered.
    pub fn remove(&self, id: &BackendId) -> Option<DynBackend> {
        let mut backends = self.backends.write();
        let index = backends.iter().position(|b| b.id() == id)?;
        let removed = backends.remove(index);
        REGISTERED_BACKENDS.set(backends.len() as f64);
        info!("[Registry] Removed backend {}", id);
        Some(removed)
    }

    pub fn get(&self, id: &BackendId) -> Option<DynBackend> {
        self.backends.read().iter().find(|b| b.id() == id).cloned()
    }

    pub fn contains(&self, id: &BackendId) -> bool {
        self.backends.read().iter().any(|b| b.id() == id)
    }

    /// Resolve ids in the given order; any unknown id is an error.
    pub fn resolve(&self, ids: &[BackendId]) -> Result<Vec<DynBackend>, RegistryError> {
        ids.iter()
            .map(|id| {
                self.get(id)
                    .ok_or_else(|| RegistryError::UnknownBackend(id.clone()))
            })
            .collect()
    }

    /// All backends in registration order.
    pub fn all(&self) -> Vec<DynBackend> {
        self.backends.read().clone()
    }

    /// All ids in registration order.
    pub fn ids(&self) -> Vec<BackendId> {
        self.backends.read().iter().map(|b| b.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.read().is_empty()
    }

    /// Drop every registered backend.
    pub fn reset(&self) {
        let mut backends = self.backends.write();
        info!("[Registry] Resetting {} backends", backends.len());
        backends.clear();
        REGISTERED_BACKENDS.set(0.0);
    }
}
