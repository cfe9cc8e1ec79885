//! Tracing setup for bazaarctl
//!
//! Logs go to stderr so JSON on stdout stays machine-readable.
//!
//! Usage:
//!   bazaarctl --debug ...                    # Debug logging to console
//!   RUST_LOG=bazaar_store=debug bazaarctl    # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                                 # Log filter (default: config `logging.level`)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Enable debug logging (overrides the default level, not RUST_LOG)
    pub debug: bool,
    /// Filter directive used when RUST_LOG is unset
    pub default_level: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            default_level: "info".to_string(),
        }
    }
}

impl TracingConfig {
    fn filter(&self) -> EnvFilter {
        let fallback = if self.debug { "debug" } else { self.default_level.as_str() };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }
}

/// Initialize tracing with console output on stderr
pub fn init(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(config.debug) // Show targets in debug mode
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
