//! Variable-origin tracing errors.

use super::error_code::{self, ErrorCode};

/// Hard failures of the origin tracer.
///
/// Tracing currently degrades in place — cycles and unknown names return
/// the input unchanged — so nothing constructs these yet; the enum fixes
/// the boundary for callers that will want hard failures.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("trace depth exceeded for {var} in {pkg}.{func}")]
    DepthExceeded {
        var: String,
        pkg: String,
        func: String,
    },

    #[error("function {pkg}.{func} not found in the metadata graph")]
    FunctionNotFound { pkg: String, func: String },
}

impl ErrorCode for TraceError {
    fn error_code(&self) -> &'static str {
        error_code::TRACE_ERROR
    }
}
