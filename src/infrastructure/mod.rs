//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`drivers`] - Storage backends (file, Redis, Memcached, in-process, no-op)
//! - [`serializer`] - Encoding of stored envelopes

pub mod drivers;
pub mod serializer;
