//! No-op driver used when caching is disabled.

use super::driver::CacheDriver;
use crate::error::CacheResult;
use async_trait::async_trait;
use tracing::debug;

/// A driver that stores nothing.
///
/// Selected by an empty descriptor. Every read is a miss and every write
/// succeeds without storing data.
pub struct NullDriver;

impl NullDriver {
    /// Creates a new NullDriver instance.
    pub fn new() -> Self {
        debug!("Using NullDriver (caching disabled)");
        Self
    }
}

impl Default for NullDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheDriver for NullDriver {
    fn name(&self) -> &'static str {
        "nocache"
    }

    async fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl_seconds: u64) -> CacheResult<()> {
        Ok(())
    }

    async fn clear(&self, _key: &str) -> bool {
        true
    }

    async fn reset(&self, _prefix: &str, _suffix: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_driver_stores_nothing() {
        let driver = NullDriver::new();

        assert!(driver.set("k", b"v", 0).await.is_ok());
        assert_eq!(driver.get("k").await, None);
        assert!(driver.clear("k").await);
        assert!(driver.reset("", "").await);
        assert_eq!(driver.name(), "nocache");
    }
}
