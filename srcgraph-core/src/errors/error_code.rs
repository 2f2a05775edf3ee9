//! Stable error codes for machine consumers.

/// Structural input error code.
pub const EXTRACT_ERROR: &str = "SRCGRAPH_EXTRACT";

/// Missing-input error code.
pub const EMPTY_INPUT: &str = "SRCGRAPH_EMPTY_INPUT";

/// Persistence error code.
pub const PERSIST_ERROR: &str = "SRCGRAPH_PERSIST";

/// Variable-origin tracing error code.
pub const TRACE_ERROR: &str = "SRCGRAPH_TRACE";

/// Trait implemented by every srcgraph error enum.
pub trait ErrorCode {
    /// Stable machine-readable code for this error.
    fn error_code(&self) -> &'static str;
}
