//! Diagnostic logging for the CLI binaries
//!
//! stdout carries the JSON document, so every event goes to stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `structlens_core=debug`
pub const LOG_ENV: &str = "STRUCTLENS_LOG";

/// Install the stderr subscriber. Falls back to `RUST_LOG`, then `warn`.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
