//! Domain types: descriptors, capabilities and the stored envelope.
//!
//! - [`descriptor`] - Parsing of backend connection strings
//! - [`capability`] - Runtime availability of optional backends
//! - [`envelope`] - Value + creation time + TTL record

pub mod capability;
pub mod descriptor;
pub mod envelope;

pub use capability::{Accelerator, Capabilities, Capability, RuntimeCapabilities};
pub use descriptor::{Descriptor, RedisTarget};
pub use envelope::{Entry, Envelope};
