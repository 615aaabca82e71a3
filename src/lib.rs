//! # Cache Helper
//!
//! One caching API over whichever backend the deployment has: files,
//! Redis, Memcached, an in-process store, or nothing at all.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Descriptors, capabilities and the stored envelope
//! - **Application Layer** ([`application`]) - The [`Cache`] facade
//! - **Infrastructure Layer** ([`infrastructure`]) - Storage drivers and serializer
//!
//! ## Descriptors
//!
//! | Descriptor | Driver |
//! |------------|--------|
//! | `""` | no-op |
//! | `redis=HOST[:PORT[:DB]]` | Redis |
//! | `memcached=HOST1[;HOST2...]` | Memcached |
//! | `folder=PATH` | files under `PATH` |
//! | `apc`, `apcu`, `wincache`, `xcache` | in-process store |
//! | `auto` | first loaded in-process store |
//!
//! Anything else, or a backend that is not available, falls back to files
//! under the configured directory.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cache_helper::{Cache, Serializer};
//!
//! let cache = Cache::new("folder=/tmp/app-cache/", "app", "/tmp/fallback/", Serializer::default());
//!
//! cache.set("user:42", &profile, 300).await?;
//! if let Some(entry) = cache.get::<Profile>("user:42").await? {
//!     println!("cached at {} for {}s", entry.created_at, entry.ttl);
//! }
//! ```
//!
//! ## Configuration
//!
//! Settings can be loaded from environment variables via [`config::CacheConfig`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub mod config;
pub mod telemetry;

pub use application::Cache;
pub use error::{CacheError, CacheResult};
pub use infrastructure::serializer::{Engine, Serializer};

/// Commonly used types for external consumers.
pub mod prelude {
    pub use crate::application::Cache;
    pub use crate::config::CacheConfig;
    pub use crate::domain::{Accelerator, Capabilities, Capability, Entry, RuntimeCapabilities};
    pub use crate::error::{CacheError, CacheResult};
    pub use crate::infrastructure::drivers::CacheDriver;
    pub use crate::infrastructure::serializer::{Engine, Serializer};
}
