// src/infra/logger.rs - Structured logging with tracing
//
// Logs go to stderr; stdout carries round tables and reports.

use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
