//! Backend capability probing.
//!
//! Driver resolution only picks a networked or in-process backend when the
//! matching client is actually usable in this process. The check is behind
//! the [`Capabilities`] trait so tests can decide availability explicitly.

use std::fmt;
use std::str::FromStr;

/// In-process accelerator families a descriptor can name.
///
/// The declaration order is the probe order used by `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accelerator {
    Apc,
    Apcu,
    Wincache,
    Xcache,
}

impl Accelerator {
    /// Every accelerator, in probe order.
    pub const ALL: [Accelerator; 4] = [
        Accelerator::Apc,
        Accelerator::Apcu,
        Accelerator::Wincache,
        Accelerator::Xcache,
    ];

    /// The descriptor keyword naming this accelerator.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Apc => "apc",
            Self::Apcu => "apcu",
            Self::Wincache => "wincache",
            Self::Xcache => "xcache",
        }
    }

    /// Looks up an accelerator by its exact (lowercase) keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.keyword() == keyword)
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Accelerator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown accelerator '{}'", s.trim()))
    }
}

/// A runtime facility a backend depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Redis,
    Memcached,
    Accelerator(Accelerator),
}

/// Answers whether a backend can be used in this process.
#[cfg_attr(test, mockall::automock)]
pub trait Capabilities: Send + Sync {
    fn is_available(&self, capability: Capability) -> bool;
}

/// Capability set of the running process.
///
/// Redis and Memcached clients are part of this crate, so they are
/// available unless switched off. Accelerators are in-process stores that
/// have to be declared as loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCapabilities {
    pub redis: bool,
    pub memcached: bool,
    pub accelerators: Vec<Accelerator>,
}

impl RuntimeCapabilities {
    /// Creates a capability set with the network clients enabled and the
    /// given accelerators loaded.
    pub fn new(accelerators: Vec<Accelerator>) -> Self {
        Self {
            redis: true,
            memcached: true,
            accelerators,
        }
    }

    /// A capability set where nothing optional is available.
    pub fn none() -> Self {
        Self {
            redis: false,
            memcached: false,
            accelerators: Vec::new(),
        }
    }
}

impl Default for RuntimeCapabilities {
    fn default() -> Self {
        Self::new(vec![Accelerator::Apcu])
    }
}

impl Capabilities for RuntimeCapabilities {
    fn is_available(&self, capability: Capability) -> bool {
        match capability {
            Capability::Redis => self.redis,
            Capability::Memcached => self.memcached,
            Capability::Accelerator(accelerator) => self.accelerators.contains(&accelerator),
        }
    }
}
