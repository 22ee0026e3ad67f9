//! Backend resolution and the readiness barrier.
//!
//! The active backend is resolved exactly once per process from the
//! `SOURCEMAP_BACKEND` selector and held as shared, read-only state. Its
//! asynchronous setup is exposed as a single-shot shared future; [`barrier`]
//! joins that future and is meant to run before every test case.

use std::fmt;
use std::sync::{Arc, OnceLock};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::config::{BackendKind, ConfigError};
use crate::interfaces::{BackendError, MappingBackend};

#[cfg(any(feature = "node", feature = "wasm"))]
mod intern;
#[cfg(feature = "node")]
pub mod node;
#[cfg(feature = "wasm")]
pub mod wasm;

/// Single-shot readiness signal.
///
/// Settles exactly once per process; every later awaiter observes the same
/// terminal outcome without re-running setup.
pub type Readiness = Shared<BoxFuture<'static, std::result::Result<(), BackendError>>>;

/// Errors surfaced by the readiness barrier.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BarrierError {
    /// The selector resolved to no backend; nothing is exposed.
    #[error("No backend resolved: {0}")]
    Unresolved(#[from] ConfigError),

    /// The backend's initialization settled negatively.
    #[error("Backend initialization failed: {0}")]
    Init(#[from] BackendError),
}

/// The resolved backend: its public API plus its readiness signal.
pub struct Backend {
    kind: BackendKind,
    api: Arc<dyn MappingBackend>,
    ready: Readiness,
}

impl Backend {
    /// Wrap a backend implementation, capturing its one-time setup as a
    /// shared readiness future. Setup starts on the first await and settles
    /// at most once.
    pub fn new(kind: BackendKind, api: Arc<dyn MappingBackend>) -> Self {
        let ready = {
            let api = Arc::clone(&api);
            async move { api.init().await }.boxed().shared()
        };
        Self { kind, api, ready }
    }

    /// Load the implementation for `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the selected backend was not compiled in; a missing build
    /// artifact aborts the run before any test executes.
    pub fn load(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Node => Self::load_node(),
            BackendKind::Wasm => Self::load_wasm(),
        }
    }

    #[cfg(feature = "node")]
    fn load_node() -> Self {
        Self::new(BackendKind::Node, Arc::new(node::NodeBackend::new()))
    }

    #[cfg(not(feature = "node"))]
    fn load_node() -> Self {
        panic!("node backend not compiled in. Build with --features node");
    }

    #[cfg(feature = "wasm")]
    fn load_wasm() -> Self {
        Self::new(BackendKind::Wasm, Arc::new(wasm::WasmBackend::new()))
    }

    #[cfg(not(feature = "wasm"))]
    fn load_wasm() -> Self {
        panic!("wasm backend not compiled in. Build with --features wasm");
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// The backend's public API surface.
    pub fn api(&self) -> &Arc<dyn MappingBackend> {
        &self.api
    }

    /// Clone of the readiness signal.
    pub fn ready(&self) -> Readiness {
        self.ready.clone()
    }

    /// Suspend until this backend's initialization has settled.
    pub async fn wait_ready(&self) -> std::result::Result<(), BackendError> {
        self.ready.clone().await
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind)
            .field("api", &self.api.name())
            .field("ready", &self.ready.peek().is_some())
            .finish()
    }
}

/// Process-wide resolved backend. Written once, read-only after.
static RESOLVED: OnceLock<std::result::Result<Backend, ConfigError>> = OnceLock::new();

fn resolved() -> &'static std::result::Result<Backend, ConfigError> {
    RESOLVED.get_or_init(|| match BackendKind::from_env() {
        Ok(kind) => {
            debug!("Resolved mapping backend: {}", kind);
            Ok(Backend::load(kind))
        }
        Err(e) => {
            warn!("No mapping backend exposed: {}", e);
            Err(e)
        }
    })
}

/// The process-wide backend, if the selector resolved to one.
///
/// The selector is read on the first call; repeated calls return the same
/// handle. An unrecognized selector exposes nothing, which every subsequent
/// [`barrier`] invocation reports as a failure.
pub fn resolve() -> Option<&'static Backend> {
    resolved().as_ref().ok()
}

/// Pre-test readiness barrier.
///
/// Suspends until the resolved backend's initialization has settled, then
/// yields the handle so the caller can reach the API. Fails if no backend
/// was resolved or if initialization settled negatively; the signal is
/// single-shot, so every invocation after a failure fails identically.
pub async fn barrier() -> std::result::Result<&'static Backend, BarrierError> {
    match resolved() {
        Ok(backend) => {
            backend.wait_ready().await?;
            Ok(backend)
        }
        Err(e) => Err(BarrierError::Unresolved(e.clone())),
    }
}
