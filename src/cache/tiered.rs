//! The tiered cache facade.
//!
//! One `set`/`get` surface over four storage tiers. The facade owns the
//! liveness rules (TTL plus version stamp), drops rejected entries as a
//! side effect of reads, and is the boundary where every storage failure
//! degrades to a miss or a dropped write. Callers must always be able to
//! recompute a value on a miss; nothing behind this type is a store of
//! record.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::entry::{now_ms, CacheEntry};
use crate::config::{CacheConfig, TtlConfig};
use crate::store::archive::ArchiveTier;
use crate::store::file::FileTier;
use crate::store::memory::MemoryTier;
use crate::store::{Strategy, TierStore};

/// Options for a single `set` call. Unset fields fall back to the tier's
/// default TTL and the cache's version stamp.
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    pub strategy: Strategy,
    pub ttl: Option<Duration>,
    pub version: Option<String>,
}

impl SetOptions {
    /// Options targeting `strategy`, everything else at defaults.
    pub fn strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Override the entry TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Override the version stamp written into the entry.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Read-only snapshot of cache state.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Entries currently held by the memory tier.
    pub memory_entries: usize,
    /// Memory tier capacity.
    pub max_memory_entries: usize,
    /// Version stamp this cache reads and writes with.
    pub version: String,
    /// Facade reads that returned a value.
    pub hits: u64,
    /// Facade reads that returned nothing.
    pub misses: u64,
}

/// The tiered cache.
///
/// Construct one per process from a [`CacheConfig`] and share it by
/// reference; all methods take `&self`. Each instance gets a fresh
/// session directory, so session entries never leak between instances.
pub struct TieredCache {
    version: String,
    ttl: TtlConfig,
    memory: MemoryTier,
    local: FileTier,
    session: FileTier,
    archive: ArchiveTier,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TieredCache {
    /// Build the cache and its tiers. On-disk state is touched lazily by
    /// the first operation of each tier, so construction itself cannot
    /// fail.
    pub fn new(config: CacheConfig) -> Self {
        let session_dir = config
            .session_root
            .join(format!("session-{}", Uuid::new_v4()));
        Self {
            memory: MemoryTier::new(config.max_memory_entries),
            local: FileTier::durable(config.local_dir),
            session: FileTier::session(session_dir),
            archive: ArchiveTier::new(config.archive_dir, config.archive_map_size),
            version: config.version,
            ttl: config.ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Version stamp carried by entries this cache writes.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Directory holding this instance's session entries.
    pub fn session_dir(&self) -> &Path {
        self.session.dir()
    }

    /// Store `data` under `key` in the tier selected by `options`.
    ///
    /// Fire-and-forget: serialization and storage failures are logged and
    /// dropped, and there is no success signal.
    pub async fn set<T: Serialize>(&self, key: &str, data: &T, options: SetOptions) {
        let store = self.store(options.strategy);
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, tier = store.name(), error = %err, "cache write dropped: unserializable payload");
                return;
            }
        };

        let ttl = options
            .ttl
            .unwrap_or_else(|| self.ttl.for_strategy(options.strategy));
        let version = options.version.unwrap_or_else(|| self.version.clone());
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        let entry = CacheEntry::new(data, now_ms(), ttl_ms, version);

        if let Err(err) = store.set(key, entry).await {
            warn!(key, tier = store.name(), error = %err, "cache write dropped");
        }
    }

    /// Fetch a live value from one tier.
    ///
    /// Returns `None` on absence, expiry, version mismatch, a payload
    /// that does not decode as `T`, or any storage failure. Entries
    /// rejected during the read are removed from the tier.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, strategy: Strategy) -> Option<T> {
        let result = self.get_in(key, strategy).await;
        self.count_outcome(result.is_some());
        result
    }

    /// Try `strategies` in order and return the first live hit.
    ///
    /// `Strategy::FALLBACK` is the usual order. A hit in a slow tier is
    /// not copied into faster tiers; repopulation stays the caller's
    /// decision.
    pub async fn get_with_fallback<T: DeserializeOwned>(
        &self,
        key: &str,
        strategies: &[Strategy],
    ) -> Option<T> {
        for &strategy in strategies {
            if let Some(data) = self.get_in(key, strategy).await {
                self.count_outcome(true);
                return Some(data);
            }
        }
        self.count_outcome(false);
        None
    }

    /// Clear one tier. Best-effort; a failure is logged and swallowed.
    pub async fn clear(&self, strategy: Strategy) {
        let store = self.store(strategy);
        if let Err(err) = store.clear().await {
            warn!(tier = store.name(), error = %err, "cache clear failed");
        }
    }

    /// Clear every tier. Tiers are cleared independently, so one failing
    /// does not stop the others.
    pub async fn clear_all(&self) {
        futures::join!(
            self.clear(Strategy::Memory),
            self.clear(Strategy::Local),
            self.clear(Strategy::Session),
            self.clear(Strategy::Archive),
        );
    }

    /// Read-only snapshot; no side effects on entries or counters.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            memory_entries: self.memory.len().await,
            max_memory_entries: self.memory.capacity().await,
            version: self.version.clone(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn store(&self, strategy: Strategy) -> &dyn TierStore {
        match strategy {
            Strategy::Memory => &self.memory,
            Strategy::Local => &self.local,
            Strategy::Session => &self.session,
            Strategy::Archive => &self.archive,
        }
    }

    /// One tier lookup with the full liveness and decode pipeline, shared
    /// by [`get`] and [`get_with_fallback`] so the counters stay at the
    /// outer calls.
    ///
    /// [`get`]: TieredCache::get
    /// [`get_with_fallback`]: TieredCache::get_with_fallback
    async fn get_in<T: DeserializeOwned>(&self, key: &str, strategy: Strategy) -> Option<T> {
        let value = self.live_value(key, strategy).await?;
        match serde_json::from_value(value) {
            Ok(data) => {
                debug!(key, tier = self.store(strategy).name(), "cache hit");
                Some(data)
            }
            Err(err) => {
                warn!(key, tier = self.store(strategy).name(), error = %err, "cached payload does not match requested type, dropping entry");
                self.remove_entry(key, strategy).await;
                None
            }
        }
    }

    /// Raw live payload from one tier. Stale, foreign-version, and
    /// unreadable entries are removed here so the next read starts clean.
    async fn live_value(&self, key: &str, strategy: Strategy) -> Option<Value> {
        let store = self.store(strategy);
        match store.get(key).await {
            Ok(Some(entry)) if entry.is_live(now_ms(), &self.version) => Some(entry.data),
            Ok(Some(_)) => {
                debug!(key, tier = store.name(), "stale entry dropped on read");
                self.remove_entry(key, strategy).await;
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!(key, tier = store.name(), error = %err, "cache read failed, treating as miss");
                self.remove_entry(key, strategy).await;
                None
            }
        }
    }

    /// Best-effort removal used for self-healing.
    async fn remove_entry(&self, key: &str, strategy: Strategy) {
        let store = self.store(strategy);
        if let Err(err) = store.remove(key).await {
            warn!(key, tier = store.name(), error = %err, "failed to drop rejected cache entry");
        }
    }

    fn count_outcome(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }
}
