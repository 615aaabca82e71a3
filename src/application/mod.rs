//! Application layer: the cache facade.

pub mod cache;

pub use cache::{Cache, KEY_SEPARATOR};
