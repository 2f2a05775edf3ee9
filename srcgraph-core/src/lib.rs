//! Core types, interning, errors, constants, and tracing for the srcgraph
//! metadata engine.
//!
//! This crate holds everything the analysis crate builds on but that has no
//! analysis logic of its own: the string pool, performance collections,
//! the error taxonomy, shared constants, and tracing setup.

pub mod constants;
pub mod errors;
pub mod telemetry;
pub mod types;
