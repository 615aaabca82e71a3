#![allow(dead_code)]

use cache_helper::domain::RuntimeCapabilities;
use cache_helper::{Cache, Engine, Serializer};
use std::path::Path;
use std::sync::Arc;

pub fn json() -> Serializer {
    Serializer::new(Some(Engine::PortableDefault))
}

/// A facade writing files under `dir` through a `folder=` descriptor.
pub fn folder_cache(dir: &Path, prefix: &str) -> Cache {
    folder_cache_with(dir, prefix, json())
}

pub fn folder_cache_with(dir: &Path, prefix: &str, serializer: Serializer) -> Cache {
    let dsn = format!("folder={}", dir.display());
    Cache::with_capabilities(
        &dsn,
        prefix,
        dir.join("fallback"),
        serializer,
        Arc::new(RuntimeCapabilities::none()),
    )
}

/// A facade over `dsn` where nothing optional is available.
pub fn bare_cache(dsn: &str, dir: &Path) -> Cache {
    Cache::with_capabilities(
        dsn,
        "app",
        dir,
        json(),
        Arc::new(RuntimeCapabilities::none()),
    )
}
