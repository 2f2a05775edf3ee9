//! Tracing initialization for the srcgraph engine.
//! `tracing` crate with `EnvFilter`, per-subsystem log levels.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the srcgraph tracing/logging system.
///
/// Reads the `SRCGRAPH_LOG` environment variable for per-subsystem log
/// levels. Format: `SRCGRAPH_LOG=extract=debug,graph=info,persist=warn`
///
/// Falls back to `srcgraph=info` if `SRCGRAPH_LOG` is not set or is invalid.
///
/// This function is idempotent — calling it multiple times is safe.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("SRCGRAPH_LOG")
            .unwrap_or_else(|_| EnvFilter::new("srcgraph=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}
