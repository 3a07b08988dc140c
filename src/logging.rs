//! Tracing setup for the highlander CLI.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the binary (or to the embedding application).

use crate::error::{HighlanderError, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Pick the filter directive: RUST_LOG (if set) takes precedence, then
/// -v/-vv map to "debug"/"trace", otherwise `default_level` applies.
pub fn filter_directive(verbosity: u8, default_level: &str, rust_log: Option<String>) -> String {
    if let Some(filter) = rust_log.filter(|f| !f.trim().is_empty()) {
        return filter;
    }

    match verbosity {
        0 => default_level.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Initialize tracing on stderr.
pub fn init_tracing(verbosity: u8, default_level: &str) -> Result<()> {
    let filter = filter_directive(verbosity, default_level, std::env::var("RUST_LOG").ok());
    let filter_layer = EnvFilter::try_new(&filter)
        .map_err(|e| HighlanderError::Config(format!("invalid log filter '{}': {}", filter, e)))?;

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // Allow re-init to be a no-op in tests
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();

    Ok(())
}
