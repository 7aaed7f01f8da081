//! The stored unit and its liveness rules.
//!
//! Every tier persists the same envelope: the payload plus the metadata
//! needed to decide whether a later read may still return it. An entry is
//! live when its TTL has not elapsed and its version stamp matches the
//! reading cache; everything else is treated as absent and dropped.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A single cached value with the metadata that governs its lifetime.
///
/// Entries are never refreshed in place: a read may bump LRU order in the
/// memory tier, but only a new `set` re-stamps the timestamp, TTL, or
/// version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached payload.
    pub data: T,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Time-to-live in milliseconds, relative to `timestamp`.
    pub ttl_ms: u64,
    /// Version stamp of the cache that wrote the entry.
    pub version: String,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, timestamp: i64, ttl_ms: u64, version: String) -> Self {
        Self {
            data,
            timestamp,
            ttl_ms,
            version,
        }
    }

    /// Whether the TTL has elapsed as of `now`. An entry exactly at its
    /// TTL boundary is still fresh. Out-of-range timestamps and TTLs
    /// saturate instead of wrapping, so a stored entry can make this
    /// return `true` but never panic.
    pub fn is_expired(&self, now: i64) -> bool {
        let elapsed = now.saturating_sub(self.timestamp);
        elapsed > i64::try_from(self.ttl_ms).unwrap_or(i64::MAX)
    }

    /// An entry may be returned iff it is fresh and was written under the
    /// same version stamp the reader carries.
    pub fn is_live(&self, now: i64, current_version: &str) -> bool {
        !self.is_expired(now) && self.version == current_version
    }
}
