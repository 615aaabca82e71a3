//! Cache configuration loaded from environment variables.
//!
//! ```bash
//! export CACHE_DSN="redis=127.0.0.1:6379:0"
//! export CACHE_PREFIX="myapp"
//! export CACHE_DIR="/var/cache/myapp/"
//! ```
//!
//! ## Variables
//!
//! - `CACHE_DSN` - Backend descriptor (default: empty, caching disabled)
//! - `CACHE_PREFIX` - Key namespace (default: `cache`)
//! - `CACHE_DIR` - Fallback directory for the file driver
//!   (default: `<tmp>/cache-helper`)
//! - `CACHE_ENGINE` - `compact-binary` or `portable-default` (default: auto)
//! - `CACHE_ACCELERATORS` - Comma-separated loaded accelerators (default: `apcu`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::application::KEY_SEPARATOR;
use crate::domain::capability::Accelerator;
use crate::infrastructure::serializer::Engine;

/// Cache configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dsn: String,
    pub prefix: String,
    /// Root of the file driver used when the descriptor cannot be honoured.
    pub dir: PathBuf,
    /// `None` lets the serializer pick the best compiled-in engine.
    pub engine: Option<Engine>,
    pub accelerators: Vec<Accelerator>,
    pub log_level: String,
    pub log_format: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            prefix: "cache".to_string(),
            dir: env::temp_dir().join("cache-helper"),
            engine: None,
            accelerators: vec![Accelerator::Apcu],
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl CacheConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `CACHE_ENGINE` or `CACHE_ACCELERATORS` hold
    /// unknown names.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let dsn = env::var("CACHE_DSN").unwrap_or_default();
        let prefix = env::var("CACHE_PREFIX").unwrap_or(defaults.prefix);
        let dir = env::var("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.dir);

        let engine = match env::var("CACHE_ENGINE") {
            Ok(name) if !name.trim().is_empty() => Some(
                name.parse::<Engine>()
                    .context("Failed to parse CACHE_ENGINE")?,
            ),
            _ => None,
        };

        let accelerators = match env::var("CACHE_ACCELERATORS") {
            Ok(list) => Self::parse_accelerators(&list)?,
            Err(_) => defaults.accelerators,
        };

        let log_level = env::var("RUST_LOG").unwrap_or(defaults.log_level);
        let log_format = env::var("LOG_FORMAT").unwrap_or(defaults.log_format);

        Ok(Self {
            dsn,
            prefix,
            dir,
            engine,
            accelerators,
            log_level,
            log_format,
        })
    }

    /// Parses a comma-separated accelerator list; blank items are skipped.
    fn parse_accelerators(list: &str) -> Result<Vec<Accelerator>> {
        list.split(',')
            .filter(|item| !item.trim().is_empty())
            .map(|item| {
                item.parse::<Accelerator>()
                    .map_err(anyhow::Error::msg)
                    .context("Failed to parse CACHE_ACCELERATORS")
            })
            .collect()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `prefix` is empty or contains the key separator
    /// - `dir` is empty
    /// - `log_format` is not `text` or `json`
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            anyhow::bail!("CACHE_PREFIX must not be empty");
        }

        if self.prefix.contains(KEY_SEPARATOR) {
            anyhow::bail!(
                "CACHE_PREFIX must not contain '{}', got '{}'",
                KEY_SEPARATOR,
                self.prefix
            );
        }

        if self.dir.as_os_str().is_empty() {
            anyhow::bail!("CACHE_DIR must not be empty");
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        Ok(())
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Cache configuration loaded:");
        if self.dsn.is_empty() {
            tracing::info!("  Descriptor: (empty, caching disabled)");
        } else {
            tracing::info!("  Descriptor: {}", self.dsn);
        }
        tracing::info!("  Prefix: {}", self.prefix);
        tracing::info!("  Fallback dir: {}", self.dir.display());
        match self.engine {
            Some(engine) => tracing::info!("  Engine: {}", engine),
            None => tracing::info!("  Engine: auto"),
        }
        tracing::info!("  Accelerators: {:?}", self.accelerators);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Loads `.env` if present, then loads and validates configuration.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or validation fails.
pub fn load_from_env() -> Result<CacheConfig> {
    dotenvy::dotenv().ok();

    let config = CacheConfig::from_env()?;
    config.validate()?;
    Ok(config)
}
