//! Contract traits for mapping backends.
//!
//! Every backend fulfills the same two contracts: [`MappingBackend`] (the
//! shared, read-only handle the resolver exposes) and [`MappingContainer`]
//! (the per-consumer mutable container it hands out). The interface tests in
//! `tests/interfaces/` verify the contracts against each implementation.

pub mod backend;
pub mod container;

pub use backend::{BackendError, MappingBackend};
pub use container::{Mapping, MappingContainer, MappingError, OriginalLocation, Position};
