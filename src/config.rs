//! Backend selection configuration.
//!
//! The only configuration this crate reads is the backend selector, consumed
//! exactly once per process when the resolver first runs.

/// Environment variable naming the backend implementation.
pub const BACKEND_ENV_VAR: &str = "SOURCEMAP_BACKEND";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "SOURCEMAP_LOG";

/// Errors that can occur reading the backend selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown backend {0:?}: expected \"node\" or \"wasm\"")]
    UnknownBackend(String),
}

/// Backend implementation discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Per-line segment layout (default).
    #[default]
    Node,
    /// Flat linear-memory segment layout.
    Wasm,
}

impl BackendKind {
    /// Read the selector from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_selector(std::env::var(BACKEND_ENV_VAR).ok().as_deref())
    }

    /// Map a selector value to a backend kind.
    ///
    /// Absent and empty are equivalent to `"node"`. Anything outside the
    /// recognized set is an error, not a fallback.
    pub fn from_selector(selector: Option<&str>) -> Result<Self, ConfigError> {
        match selector {
            None | Some("") | Some("node") => Ok(BackendKind::Node),
            Some("wasm") => Ok(BackendKind::Wasm),
            Some(other) => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }

    /// Stable selector value for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Node => "node",
            BackendKind::Wasm => "wasm",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
