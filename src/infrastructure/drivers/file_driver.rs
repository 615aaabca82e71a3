//! Filesystem-backed driver: one file per key under a root directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::driver::{CacheDriver, matches_pattern};
use crate::error::CacheResult;
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

/// Stores each entry in its own file named after the key.
///
/// This is also the fallback target whenever a descriptor names a backend
/// that is unknown or unavailable. The TTL hint is ignored; expiry is
/// enforced by the facade.
pub struct FileDriver {
    root: PathBuf,
}

impl FileDriver {
    /// Creates a driver rooted at `root`, creating the directory if needed.
    ///
    /// A directory that cannot be created is logged, not fatal: reads will
    /// miss and writes will report the failure.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();

        if !root.exists() {
            if let Err(e) = std::fs::create_dir_all(&root) {
                warn!("Failed to create cache dir {}: {}", root.display(), e);
            }
        }

        debug!("Using FileDriver at {}", root.display());
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a key to its file, dropping path separators so a key can never
    /// leave the root directory.
    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key.chars().filter(|c| *c != '/' && *c != '\\').collect();
        self.root.join(file_name)
    }
}

#[async_trait]
impl CacheDriver for FileDriver {
    fn name(&self) -> &'static str {
        "filecache"
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => {
                debug!("File cache HIT: {}", key);
                Some(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("File cache MISS: {}", key);
                None
            }
            Err(e) => {
                warn!("File cache read error for {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8], _ttl_seconds: u64) -> CacheResult<()> {
        fs::write(self.path_for(key), value).await?;
        debug!("File cache SET: {} ({} bytes)", key, value.len());
        Ok(())
    }

    async fn clear(&self, key: &str) -> bool {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                debug!("File cache CLEAR: {}", key);
                true
            }
            Err(_) => false,
        }
    }

    async fn reset(&self, prefix: &str, suffix: &str) -> bool {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("File cache reset could not scan {}: {}", self.root.display(), e);
                return true;
            }
        };

        let mut removed = 0usize;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };

            if is_file
                && matches_pattern(name, prefix, suffix)
                && fs::remove_file(entry.path()).await.is_ok()
            {
                removed += 1;
            }
        }

        debug!("File cache RESET {}*{}: {} removed", prefix, suffix, removed);
        true
    }
}
