//! Extraction errors.

use super::error_code::{self, ErrorCode};

/// Structural errors that abort extraction.
///
/// Everything else — missing type info, unresolved names, cycles — is
/// degraded in place and reported through counters, never through errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("input contains no packages")]
    NoPackages,

    #[error("package {pkg} contains no files")]
    NoFiles { pkg: String },
}

impl ErrorCode for ExtractError {
    fn error_code(&self) -> &'static str {
        error_code::EMPTY_INPUT
    }
}
