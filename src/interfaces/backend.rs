//! Mapping backend interface.

use async_trait::async_trait;

use super::container::MappingContainer;
use crate::vlq::SelfCheckMismatch;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur during backend initialization.
///
/// Clone because the readiness future is shared: every barrier invocation
/// after a failed settlement observes the same error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("Codec self-check failed: {0}")]
    SelfCheck(#[from] SelfCheckMismatch),

    #[error("Backend setup failed: {0}")]
    Setup(String),
}

/// Interface for mapping backends.
///
/// Implementations:
/// - `NodeBackend`: per-line segment layout (default)
/// - `WasmBackend`: flat linear-memory layout
///
/// The backend object is shared read-only process state; mutation happens on
/// the per-consumer containers it hands out.
#[async_trait]
pub trait MappingBackend: Send + Sync {
    /// Stable backend name, matching its selector value.
    fn name(&self) -> &'static str;

    /// One-time asynchronous setup.
    ///
    /// Driven through the resolver's shared readiness future, so it runs at
    /// most once per process regardless of how many consumers await it.
    async fn init(&self) -> Result<()>;

    /// Create a fresh, empty mapping container.
    fn container(&self) -> Box<dyn MappingContainer>;
}
