//! Redis-backed driver.

use super::driver::CacheDriver;
use crate::domain::descriptor::RedisTarget;
use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Port used when the descriptor leaves it at `0`.
pub const REDIS_DEFAULT_PORT: u16 = 6379;

/// Keys fetched per `SCAN` round during [`CacheDriver::reset`].
const SCAN_BATCH: usize = 200;

/// Longest TTL passed to `SETEX`; Redis rejects expiries that overflow its
/// millisecond clock.
const MAX_NATIVE_TTL: u64 = (i64::MAX / 1000 / 2) as u64;

/// Redis driver with native TTL support.
///
/// The connection is opened on first use and reused through a
/// `ConnectionManager`. Reads and deletes are fail-open: errors are logged
/// and reported as a miss or `false`. Failed writes are returned to the caller.
pub struct RedisDriver {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    url: String,
}

impl RedisDriver {
    /// Builds a driver for the given target without connecting yet.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the target does not form a
    /// valid Redis URL.
    pub fn new(target: &RedisTarget) -> CacheResult<Self> {
        let url = Self::build_url(target);

        let client = Client::open(url.as_str()).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            url,
        })
    }

    /// Connection URL, e.g. `redis://127.0.0.1:6379/2`.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_url(target: &RedisTarget) -> String {
        let port = if target.port == 0 {
            REDIS_DEFAULT_PORT
        } else {
            target.port
        };

        match target.db {
            Some(db) => format!("redis://{}:{}/{}", target.host, port, db),
            None => format!("redis://{}:{}", target.host, port),
        }
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        self.connection
            .get_or_try_init(|| async {
                info!("Connecting to Redis at {}", self.url);
                let manager = ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(|e| {
                        CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
                    })?;
                info!("✓ Connected to Redis");
                Ok::<_, CacheError>(manager)
            })
            .await
            .cloned()
    }
}

/// TTL to hand to `SETEX`, or `None` to store without native expiry.
fn native_ttl(ttl_seconds: u64) -> Option<u64> {
    (ttl_seconds > 0 && ttl_seconds <= MAX_NATIVE_TTL).then_some(ttl_seconds)
}

/// Escapes Redis glob metacharacters so `text` only matches itself.
fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl CacheDriver for RedisDriver {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };

        match conn.get::<_, Option<Vec<u8>>>(key).await {
            Ok(Some(bytes)) if !bytes.is_empty() => {
                debug!("Cache HIT: {}", key);
                Some(bytes)
            }
            Ok(_) => {
                debug!("Cache MISS: {}", key);
                None
            }
            Err(e) => {
                warn!("Redis GET error for {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> CacheResult<()> {
        let mut conn = self.connection().await?;

        let result = match native_ttl(ttl_seconds) {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await,
            None => conn.set::<_, _, ()>(key, value).await,
        };

        result.map_err(|e| {
            warn!("Redis SET error for {}: {}", key, e);
            CacheError::OperationError(format!("Redis SET failed for {}: {}", key, e))
        })?;

        debug!("Cache SET: {} (TTL: {}s)", key, ttl_seconds);
        Ok(())
    }

    async fn clear(&self, key: &str) -> bool {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };

        match conn.del::<_, i32>(key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache CLEAR: {}", key);
                }
                deleted > 0
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", key, e);
                false
            }
        }
    }

    async fn reset(&self, prefix: &str, suffix: &str) -> bool {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("{}", e);
                return true;
            }
        };

        let pattern = format!("{}*{}", escape_glob(prefix), escape_glob(suffix));
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        loop {
            let scanned = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async::<(u64, Vec<String>)>(&mut conn)
                .await;

            let (next, keys) = match scanned {
                Ok(page) => page,
                Err(e) => {
                    warn!("Redis SCAN error for {}: {}", pattern, e);
                    break;
                }
            };

            if !keys.is_empty() {
                match conn.del::<_, usize>(keys).await {
                    Ok(count) => removed += count,
                    Err(e) => warn!("Redis DEL error during reset of {}: {}", pattern, e),
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Cache RESET {}: {} removed", pattern, removed);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(host: &str, port: u16, db: Option<i64>) -> RedisTarget {
        RedisTarget {
            host: host.to_string(),
            port,
            db,
        }
    }

    #[test]
    fn test_url_uses_default_port() {
        let driver = RedisDriver::new(&target("localhost", 0, None)).unwrap();
        assert_eq!(driver.url(), "redis://localhost:6379");
        assert_eq!(driver.name(), "redis");
    }

    #[test]
    fn test_url_with_port_and_db() {
        let driver = RedisDriver::new(&target("10.0.0.5", 6380, Some(3))).unwrap();
        assert_eq!(driver.url(), "redis://10.0.0.5:6380/3");
    }

    #[test]
    fn test_native_ttl() {
        assert_eq!(native_ttl(0), None);
        assert_eq!(native_ttl(60), Some(60));
        assert_eq!(native_ttl(MAX_NATIVE_TTL), Some(MAX_NATIVE_TTL));
        assert_eq!(native_ttl(u64::MAX), None);
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("app."), "app.");
        assert_eq!(escape_glob("a*b?[c]\\"), "a\\*b\\?\\[c\\]\\\\");
    }
}
