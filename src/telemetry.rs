//! Tracing subscriber setup for processes embedding the cache.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber.
///
/// `level` is used when `RUST_LOG` is not set; `format` is `text` or `json`.
///
/// # Errors
///
/// Returns an error if the level is not a valid filter directive or a
/// global subscriber is already installed.
pub fn init_tracing(level: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

