mod common;

use cache_helper::config::CacheConfig;
use cache_helper::domain::{Accelerator, RuntimeCapabilities};
use cache_helper::{Cache, Engine};
use common::{bare_cache, json};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_empty_descriptor_disables_caching() {
    let tmp = TempDir::new().unwrap();
    let cache = bare_cache("", tmp.path());

    cache.set("k", "v", 0).await.unwrap();

    assert_eq!(cache.driver().name(), "nocache");
    assert!(cache.get::<String>("k").await.unwrap().is_none());
    assert!(cache.reset("").await);
}

#[tokio::test]
async fn test_unavailable_redis_falls_back_to_base_dir() {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("base");
    let cache = bare_cache("redis=localhost", &base);

    assert_eq!(cache.driver().name(), "filecache");
    assert!(base.is_dir());

    cache.set("k", "v", 0).await.unwrap();
    assert!(base.join("app.k").is_file());
}

#[tokio::test]
async fn test_garbage_descriptor_falls_back() {
    let tmp = TempDir::new().unwrap();

    for dsn in ["nonsense", "redis", "memcached=;", "folder=", "APCU"] {
        let cache = bare_cache(dsn, tmp.path());
        assert_eq!(cache.driver().name(), "filecache", "dsn: {dsn:?}");
    }
}

#[tokio::test]
async fn test_accelerator_store_is_shared_between_facades() {
    let tmp = TempDir::new().unwrap();
    let caps = Arc::new(RuntimeCapabilities::new(vec![Accelerator::Xcache]));

    let writer = Cache::with_capabilities("xcache", "shared-it", tmp.path(), json(), caps.clone());
    let reader = Cache::with_capabilities("auto", "shared-it", tmp.path(), json(), caps);

    assert_eq!(reader.driver().name(), "xcache");

    writer.set("k", "v", 0).await.unwrap();
    assert_eq!(reader.get::<String>("k").await.unwrap().unwrap().value, "v");

    assert!(writer.reset("").await);
    assert!(reader.get::<String>("k").await.unwrap().is_none());
}

#[tokio::test]
async fn test_huge_ttl_on_accelerator_store() {
    let tmp = TempDir::new().unwrap();
    let caps = Arc::new(RuntimeCapabilities::new(vec![Accelerator::Apcu]));
    let cache = Cache::with_capabilities("apcu", "huge-ttl", tmp.path(), json(), caps);

    cache.set("k", "v", u64::MAX).await.unwrap();

    let entry = cache.get::<String>("k").await.unwrap().unwrap();
    assert_eq!(entry.value, "v");
    assert_eq!(entry.ttl, u64::MAX);
    cache.clear("k").await;
}

#[tokio::test]
async fn test_changing_descriptor_switches_storage() {
    let tmp = TempDir::new().unwrap();
    let first = tmp.path().join("first");
    let second = tmp.path().join("second");

    let mut cache = bare_cache(&format!("folder={}", first.display()), tmp.path());
    cache.set("k", "v", 0).await.unwrap();

    cache.set_dsn(&format!("folder={}", second.display()));

    assert!(cache.get::<String>("k").await.unwrap().is_none());
    assert!(first.join("app.k").is_file());
}

#[test]
fn test_from_config() {
    let tmp = TempDir::new().unwrap();
    let config = CacheConfig {
        dsn: "auto".to_string(),
        prefix: "svc".to_string(),
        dir: tmp.path().to_path_buf(),
        engine: Some(Engine::PortableDefault),
        accelerators: vec![],
        ..CacheConfig::default()
    };

    let cache = Cache::from_config(&config);

    assert_eq!(cache.prefix(), "svc");
    assert_eq!(cache.dsn(), "auto");
    assert_eq!(cache.serializer().engine(), Engine::PortableDefault);
    assert_eq!(cache.driver().name(), "filecache");
    assert_eq!(cache.dir(), tmp.path());
}
