//! Storage driver trait.

use async_trait::async_trait;

use crate::error::CacheResult;

/// Byte-oriented key/value transport behind the cache facade.
///
/// Drivers never see envelopes, only their encoded bytes, and treat
/// "not found" and transport failures on reads and deletes as ordinary
/// outcomes rather than errors. Only a failed write is reported.
///
/// # Implementations
///
/// - [`crate::infrastructure::drivers::NullDriver`] - Caching disabled
/// - [`crate::infrastructure::drivers::FileDriver`] - One file per key
/// - [`crate::infrastructure::drivers::RedisDriver`] - Redis with native TTL
/// - [`crate::infrastructure::drivers::MemcachedDriver`] - Memcached ASCII protocol
/// - [`crate::infrastructure::drivers::SharedMemoryDriver`] - In-process accelerator store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheDriver: Send + Sync {
    /// Stable identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// Fetches the bytes stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Some(bytes)` on hit
    /// - `None` on miss or transport error
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `value` under `key`, replacing whatever was there.
    ///
    /// `ttl_seconds` is a hint for backends with native expiry; `0` means
    /// no expiry.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying medium rejects the write.
    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> CacheResult<()>;

    /// Deletes `key`. Returns `false` if nothing was deleted.
    async fn clear(&self, key: &str) -> bool;

    /// Deletes every key starting with `prefix` and ending with `suffix`.
    ///
    /// Succeeds even when nothing matched.
    async fn reset(&self, prefix: &str, suffix: &str) -> bool;
}

/// Whether `key` has the shape `prefix…suffix`.
pub(crate) fn matches_pattern(key: &str, prefix: &str, suffix: &str) -> bool {
    key.len() >= prefix.len() + suffix.len() && key.starts_with(prefix) && key.ends_with(suffix)
}
