//! Step definitions for the mapping container interface tests.

pub mod mappings;
