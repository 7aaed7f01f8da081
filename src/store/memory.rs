//! In-process LRU tier.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::entry::CacheEntry;
use crate::error::StoreError;
use crate::store::TierStore;

/// Capacity-bounded map with true LRU order.
///
/// Reads and writes both move an entry to the most-recently-used
/// position; inserting past capacity drops the least-recently-used entry.
/// Overwriting an existing key never evicts anything else.
pub struct MemoryTier {
    entries: Mutex<LruCache<String, CacheEntry<Value>>>,
}

impl MemoryTier {
    /// Create a tier holding at most `capacity` entries. A zero capacity
    /// is clamped to one so the tier always admits at least one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of entries currently held.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Maximum number of entries this tier admits.
    pub async fn capacity(&self) -> usize {
        self.entries.lock().await.cap().get()
    }
}

#[async_trait]
impl TierStore for MemoryTier {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry<Value>>, StoreError> {
        let mut entries = self.entries.lock().await;
        // LruCache::get is the recency bump.
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, entry: CacheEntry<Value>) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(key.to_string(), entry) {
            // push returns the displaced pair: the old value when the key
            // already existed, the LRU victim when the map was full.
            if evicted != key {
                debug!(key = %evicted, "memory tier evicted least-recently-used entry");
            }
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.pop(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.lock().await.clear();
        Ok(())
    }
}
