//! Persistence errors.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Errors surfaced verbatim at the split-document persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode {document}: {source}")]
    Encode {
        document: String,
        source: serde_json::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ErrorCode for PersistError {
    fn error_code(&self) -> &'static str {
        error_code::PERSIST_ERROR
    }
}
