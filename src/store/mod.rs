//! Storage tiers behind the cache facade.
//!
//! Four strategies implement one [`TierStore`] contract:
//! - [`memory`]: capacity-bounded in-process LRU map, the only bounded tier
//! - [`file`]: durable and session-scoped file-per-key stores
//! - [`archive`]: transactional LMDB store for long-lived entries

pub mod archive;
pub mod file;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::entry::CacheEntry;
use crate::error::StoreError;

/// Selects the storage tier an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// In-process LRU map; fastest, lost on exit.
    #[default]
    Memory,
    /// Durable file store with obfuscated payloads.
    Local,
    /// File store scoped to one cache instance's session directory.
    Session,
    /// Transactional LMDB store for large or long-lived entries.
    Archive,
}

impl Strategy {
    /// Every tier.
    pub const ALL: [Strategy; 4] = [
        Strategy::Memory,
        Strategy::Local,
        Strategy::Session,
        Strategy::Archive,
    ];

    /// Default order for fallback reads: fastest first. The session tier
    /// is excluded because its entries belong to one instance and are not
    /// meaningful as a shared fallback.
    pub const FALLBACK: [Strategy; 3] = [Strategy::Memory, Strategy::Local, Strategy::Archive];
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Memory => write!(f, "memory"),
            Strategy::Local => write!(f, "local"),
            Strategy::Session => write!(f, "session"),
            Strategy::Archive => write!(f, "archive"),
        }
    }
}

/// Raw storage contract implemented by every tier.
///
/// Stores hold type-erased entries and do not interpret TTLs or version
/// stamps; the facade owns the liveness rules and calls [`remove`] on
/// entries it rejects. Implementations surface their failures as
/// [`StoreError`] rather than swallowing them, because the facade is the
/// single place where failures turn into misses.
///
/// [`remove`]: TierStore::remove
#[async_trait]
pub trait TierStore: Send + Sync {
    /// Tier name used in log fields.
    fn name(&self) -> &'static str;

    /// Read the raw entry for `key`, with no liveness interpretation.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry<Value>>, StoreError>;

    /// Insert or overwrite the entry for `key`.
    async fn set(&self, key: &str, entry: CacheEntry<Value>) -> Result<(), StoreError>;

    /// Delete the entry for `key`. Deleting an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Delete every entry held by this tier.
    async fn clear(&self) -> Result<(), StoreError>;
}
