//! Storage drivers behind the cache facade.
//!
//! Provides a [`CacheDriver`] trait with five implementations:
//! - [`NullDriver`] - No-op driver for disabled caching
//! - [`FileDriver`] - Filesystem driver, also the fallback target
//! - [`RedisDriver`] - Redis-backed driver
//! - [`MemcachedDriver`] - Memcached-backed driver
//! - [`SharedMemoryDriver`] - In-process accelerator store

mod driver;
mod file_driver;
mod memcached_driver;
mod null_driver;
mod redis_driver;
mod shared_memory_driver;

pub use driver::CacheDriver;
#[cfg(test)]
pub use driver::MockCacheDriver;
pub use file_driver::FileDriver;
pub use memcached_driver::MemcachedDriver;
pub use null_driver::NullDriver;
pub use redis_driver::RedisDriver;
pub use shared_memory_driver::SharedMemoryDriver;
