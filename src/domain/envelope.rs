//! The record the facade actually stores.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Stored tuple of value, creation time and TTL.
///
/// Encoded as a three-element sequence so a reader can pull out the
/// timestamp and TTL with the value typed as [`serde::de::IgnoredAny`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T>(pub T, pub f64, pub u64);

impl<T> Envelope<T> {
    pub fn new(value: T, created_at: f64, ttl: u64) -> Self {
        Self(value, created_at, ttl)
    }

    pub fn value(&self) -> &T {
        &self.0
    }

    pub fn created_at(&self) -> f64 {
        self.1
    }

    /// TTL in seconds, `0` meaning the entry never expires.
    pub fn ttl(&self) -> u64 {
        self.2
    }

    /// Whether the entry is still valid at `now` (seconds since the epoch).
    pub fn is_live(&self, now: f64) -> bool {
        self.2 == 0 || self.1 + self.2 as f64 > now
    }

    pub fn into_entry(self) -> Entry<T> {
        Entry {
            value: self.0,
            created_at: self.1,
            ttl: self.2,
        }
    }
}

/// A live cache entry as returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub value: T,
    /// Seconds since the Unix epoch, sub-second precision.
    pub created_at: f64,
    pub ttl: u64,
}

/// Current wall-clock time in seconds since the Unix epoch.
pub fn now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
