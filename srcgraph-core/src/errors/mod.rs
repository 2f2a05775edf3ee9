//! Error taxonomy for the srcgraph engine.
//!
//! One error enum per subsystem. Analytical failures never surface here —
//! the extractor degrades conservatively; only structural input problems
//! and persistence failures are hard errors.

pub mod error_code;
pub mod extract_error;
pub mod persist_error;
pub mod trace_error;

pub use error_code::ErrorCode;
pub use extract_error::ExtractError;
pub use persist_error::PersistError;
pub use trace_error::TraceError;
