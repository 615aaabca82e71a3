//! The cache facade.
//!
//! [`Cache`] resolves a descriptor into a storage driver, namespaces keys
//! with a prefix and wraps every value in an [`Envelope`] so expiry works
//! the same on every backend, whether or not it has native TTL support.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::domain::capability::{Accelerator, Capabilities, Capability, RuntimeCapabilities};
use crate::domain::descriptor::Descriptor;
use crate::domain::envelope::{self, Entry, Envelope};
use crate::error::CacheResult;
use crate::infrastructure::drivers::{
    CacheDriver, FileDriver, MemcachedDriver, NullDriver, RedisDriver, SharedMemoryDriver,
};
use crate::infrastructure::serializer::Serializer;

/// Joins the prefix and the caller's key into the physical key.
///
/// Prefixes may not contain it: prefix `a` with key `b.k` and prefix `a.b`
/// with key `k` would share one physical key.
pub const KEY_SEPARATOR: char = '.';

/// Uniform front-end over the configured storage driver.
///
/// The driver is resolved from the descriptor on first use and kept until
/// the descriptor changes. An unknown or unavailable backend never fails:
/// it falls back to a [`FileDriver`] rooted at the configured directory.
///
/// # Concurrency
///
/// The facade does no locking of its own. [`Cache::set`] reads the current
/// entry before writing, so two concurrent writers of the same key race and
/// the last write wins.
pub struct Cache {
    dsn: String,
    prefix: String,
    dir: PathBuf,
    serializer: Serializer,
    capabilities: Arc<dyn Capabilities>,
    driver: OnceLock<Arc<dyn CacheDriver>>,
}

impl Cache {
    /// Creates a facade using the capabilities of the running process.
    pub fn new(
        dsn: &str,
        prefix: &str,
        dir: impl Into<PathBuf>,
        serializer: Serializer,
    ) -> Self {
        Self::with_capabilities(
            dsn,
            prefix,
            dir,
            serializer,
            Arc::new(RuntimeCapabilities::default()),
        )
    }

    /// Creates a facade with an explicit capability provider.
    pub fn with_capabilities(
        dsn: &str,
        prefix: &str,
        dir: impl Into<PathBuf>,
        serializer: Serializer,
        capabilities: Arc<dyn Capabilities>,
    ) -> Self {
        let mut cache = Self {
            dsn: String::new(),
            prefix: String::new(),
            dir: dir.into(),
            serializer,
            capabilities,
            driver: OnceLock::new(),
        };
        cache.set_prefix(prefix);
        cache.set_dsn(dsn);
        cache
    }

    /// Creates a facade over an already constructed driver.
    ///
    /// The descriptor is left empty; calling [`Self::set_dsn`] later replaces
    /// the driver with a resolved one.
    pub fn with_driver(driver: Arc<dyn CacheDriver>, prefix: &str, serializer: Serializer) -> Self {
        let mut cache = Self::new("", prefix, PathBuf::new(), serializer);
        cache.driver = OnceLock::from(driver);
        cache
    }

    /// Builds a facade from loaded configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_capabilities(
            &config.dsn,
            &config.prefix,
            config.dir.clone(),
            Serializer::new(config.engine),
            Arc::new(RuntimeCapabilities::new(config.accelerators.clone())),
        )
    }

    /// Returns the live entry stored under `key`, if any.
    ///
    /// A stale entry is deleted and reported as a miss.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CacheError::SerializationError`] if the stored bytes
    /// cannot be decoded as an envelope holding a `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<Entry<T>>> {
        Ok(self
            .fetch_live::<T>(key)
            .await?
            .map(Envelope::into_entry))
    }

    /// Stores `value` under `key`.
    ///
    /// If a live entry already exists, only its value is replaced: the old
    /// creation time and TTL are kept and `ttl_seconds` is ignored. Otherwise
    /// the entry starts now with `ttl_seconds` (`0` = never expires). An
    /// existing entry that cannot be decoded counts as absent and is
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or the driver
    /// rejects the write.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> CacheResult<()> {
        let existing = match self.fetch_live::<IgnoredAny>(key).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Overwriting undecodable cache entry {}: {}", key, e);
                None
            }
        };

        let (created_at, ttl) = match existing {
            Some(existing) => (existing.created_at(), existing.ttl()),
            None => (envelope::now(), ttl_seconds),
        };

        let data = self
            .serializer
            .serialize(&Envelope::new(value, created_at, ttl))?;

        self.driver()
            .set(&self.physical_key(key), &data, ttl)
            .await
    }

    /// Deletes `key`. Returns whether anything was deleted.
    pub async fn clear(&self, key: &str) -> bool {
        self.driver().clear(&self.physical_key(key)).await
    }

    /// Deletes every key under this prefix ending with `suffix`.
    ///
    /// Always returns `true`, even when nothing matched.
    pub async fn reset(&self, suffix: &str) -> bool {
        let prefix = format!("{}{}", self.prefix, KEY_SEPARATOR);
        self.driver().reset(&prefix, suffix).await
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Sets the key prefix.
    ///
    /// An empty prefix is ignored, and so is one containing
    /// [`KEY_SEPARATOR`].
    pub fn set_prefix(&mut self, prefix: &str) -> &mut Self {
        if prefix.contains(KEY_SEPARATOR) {
            warn!(
                "Ignoring cache prefix '{}': it contains '{}'",
                prefix, KEY_SEPARATOR
            );
        } else if !prefix.is_empty() {
            self.prefix = prefix.to_string();
        }
        self
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Sets the descriptor and drops the current driver.
    pub fn set_dsn(&mut self, dsn: &str) -> &mut Self {
        self.dsn = dsn.trim().to_string();
        self.driver = OnceLock::new();
        self
    }

    /// Root of the fallback file driver.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    pub fn serializer_mut(&mut self) -> &mut Serializer {
        &mut self.serializer
    }

    /// Returns the active driver, resolving it on first call.
    pub fn driver(&self) -> Arc<dyn CacheDriver> {
        self.driver.get_or_init(|| self.load()).clone()
    }

    fn physical_key(&self, key: &str) -> String {
        format!("{}{}{}", self.prefix, KEY_SEPARATOR, key)
    }

    /// Reads and decodes the envelope under `key`, deleting it if stale.
    async fn fetch_live<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<Envelope<T>>> {
        let Some(raw) = self.driver().get(&self.physical_key(key)).await else {
            return Ok(None);
        };

        let stored: Envelope<T> = self.serializer.unserialize(&raw)?;
        if stored.is_live(envelope::now()) {
            return Ok(Some(stored));
        }

        debug!("Cache entry expired: {}", key);
        self.clear(key).await;
        Ok(None)
    }

    /// Resolves the descriptor into a driver.
    ///
    /// Order matters: the network and in-process arms only apply when their
    /// capability is present, and everything that falls through ends up on
    /// the file driver rooted at `dir`.
    fn load(&self) -> Arc<dyn CacheDriver> {
        let driver: Arc<dyn CacheDriver> = match Descriptor::parse(&self.dsn) {
            Descriptor::Disabled => Arc::new(NullDriver::new()),
            Descriptor::Redis(target) if self.is_available(Capability::Redis) => {
                match RedisDriver::new(&target) {
                    Ok(driver) => Arc::new(driver),
                    Err(e) => {
                        warn!("{}. Falling back to file cache.", e);
                        self.fallback()
                    }
                }
            }
            Descriptor::Memcached(servers) if self.is_available(Capability::Memcached) => {
                Arc::new(MemcachedDriver::new(servers))
            }
            Descriptor::Folder(path) => Arc::new(FileDriver::new(path)),
            Descriptor::Accelerator(accelerator)
                if self.is_available(Capability::Accelerator(accelerator)) =>
            {
                Arc::new(SharedMemoryDriver::new(accelerator))
            }
            Descriptor::Auto => match self.first_accelerator() {
                Some(accelerator) => Arc::new(SharedMemoryDriver::new(accelerator)),
                None => self.fallback(),
            },
            _ => self.fallback(),
        };

        info!("Cache driver resolved: {} (dsn: '{}')", driver.name(), self.dsn);
        driver
    }

    fn is_available(&self, capability: Capability) -> bool {
        self.capabilities.is_available(capability)
    }

    fn first_accelerator(&self) -> Option<Accelerator> {
        Accelerator::ALL
            .into_iter()
            .find(|a| self.is_available(Capability::Accelerator(*a)))
    }

    fn fallback(&self) -> Arc<dyn CacheDriver> {
        Arc::new(FileDriver::new(self.dir.clone()))
    }
}
