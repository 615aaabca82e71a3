//! In-process accelerator driver.
//!
//! Every accelerator kind owns one process-wide store, so all drivers (and
//! therefore all facades) created for the same kind see the same entries,
//! the way a shared-memory user cache behaves inside one server process.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::driver::{CacheDriver, matches_pattern};
use crate::domain::capability::Accelerator;
use crate::error::CacheResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

struct StoredValue {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Writes between two sweeps of expired entries.
const SWEEP_INTERVAL: usize = 1024;

#[derive(Default)]
struct Store {
    entries: RwLock<HashMap<String, StoredValue>>,
    writes: AtomicUsize,
}

impl Store {
    /// Drops every expired entry. Returns how many were dropped.
    fn sweep(entries: &mut HashMap<String, StoredValue>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, value| !value.is_expired(now));
        before - entries.len()
    }
}

static STORES: LazyLock<[Store; 4]> = LazyLock::new(|| std::array::from_fn(|_| Store::default()));

fn store_for(accelerator: Accelerator) -> &'static Store {
    let index = Accelerator::ALL
        .iter()
        .position(|a| *a == accelerator)
        .unwrap_or_default();
    &STORES[index]
}

/// Driver over the process-wide store of one accelerator kind.
///
/// Honours the TTL hint natively: expired values are dropped when read,
/// on reset, and by a sweep every [`SWEEP_INTERVAL`] writes. A TTL too large
/// to represent as an instant is stored without native expiry.
pub struct SharedMemoryDriver {
    accelerator: Accelerator,
    store: &'static Store,
}

impl SharedMemoryDriver {
    pub fn new(accelerator: Accelerator) -> Self {
        debug!("Using SharedMemoryDriver ({})", accelerator);
        Self {
            accelerator,
            store: store_for(accelerator),
        }
    }

    pub fn accelerator(&self) -> Accelerator {
        self.accelerator
    }
}

#[async_trait]
impl CacheDriver for SharedMemoryDriver {
    fn name(&self) -> &'static str {
        self.accelerator.keyword()
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        {
            let store = self.store.entries.read();
            match store.get(key) {
                Some(value) if !value.is_expired(now) => return Some(value.data.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut store = self.store.entries.write();
        if store.get(key).is_some_and(|v| v.is_expired(now)) {
            store.remove(key);
            debug!("{} EXPIRED: {}", self.accelerator, key);
        }
        None
    }

    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> CacheResult<()> {
        let now = Instant::now();
        let expires_at = if ttl_seconds > 0 {
            now.checked_add(Duration::from_secs(ttl_seconds))
        } else {
            None
        };

        let mut store = self.store.entries.write();
        store.insert(
            key.to_string(),
            StoredValue {
                data: value.to_vec(),
                expires_at,
            },
        );

        let writes = self.store.writes.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        if writes % SWEEP_INTERVAL == 0 {
            let swept = Store::sweep(&mut store, now);
            debug!("{} SWEEP: {} expired removed", self.accelerator, swept);
        }
        Ok(())
    }

    async fn clear(&self, key: &str) -> bool {
        self.store.entries.write().remove(key).is_some()
    }

    async fn reset(&self, prefix: &str, suffix: &str) -> bool {
        let mut store = self.store.entries.write();
        let swept = Store::sweep(&mut store, Instant::now());
        let before = store.len();
        store.retain(|key, _| !matches_pattern(key, prefix, suffix));
        debug!(
            "{} RESET {}*{}: {} removed, {} expired",
            self.accelerator,
            prefix,
            suffix,
            before - store.len(),
            swept
        );
        true
    }
}
