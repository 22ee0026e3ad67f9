//! Source map mapping container with interchangeable backends.
//!
//! Two implementations of the same mapping container contract ship with this
//! crate: the default `node` backend (per-line segment layout) and the `wasm`
//! backend (flat layout for linear-memory targets). The active backend is
//! selected exactly once per process from the `SOURCEMAP_BACKEND` environment
//! variable, and consumers gate on its asynchronous initialization through
//! [`backend::barrier`].

pub mod backend;
pub mod config;
pub mod interfaces;
pub mod vlq;
