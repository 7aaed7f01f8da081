//! Runtime configuration for the tiered cache.
//!
//! Everything here is fixed at construction time: the version stamp, the
//! memory capacity, per-tier TTL defaults, and the storage paths of the
//! on-disk tiers. Configuration files are JSON; missing files and
//! missing fields fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::Strategy;

/// Version stamp written into entries when the config does not override it.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Top-level cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Version stamp for this process. Entries carrying any other stamp
    /// are treated as expired on read, which makes bumping this value a
    /// whole-cache invalidation.
    pub version: String,

    /// Maximum number of entries the memory tier holds.
    pub max_memory_entries: usize,

    /// Default TTL per tier, applied when a `set` does not override it.
    pub ttl: TtlConfig,

    /// Directory backing the durable file tier.
    pub local_dir: PathBuf,

    /// Root under which each cache instance creates its own session
    /// directory.
    pub session_root: PathBuf,

    /// Directory backing the archive database.
    pub archive_dir: PathBuf,

    /// Maximum size of the archive database, in bytes.
    pub archive_map_size: usize,
}

/// Per-tier default TTLs, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    pub memory_ms: u64,
    pub local_ms: u64,
    pub session_ms: u64,
    pub archive_ms: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            memory_ms: 5 * 60 * 1000,
            local_ms: 60 * 60 * 1000,
            session_ms: 30 * 60 * 1000,
            archive_ms: 24 * 60 * 60 * 1000,
        }
    }
}

impl TtlConfig {
    /// Default TTL for one tier.
    pub fn for_strategy(&self, strategy: Strategy) -> Duration {
        let ms = match strategy {
            Strategy::Memory => self.memory_ms,
            Strategy::Local => self.local_ms,
            Strategy::Session => self.session_ms,
            Strategy::Archive => self.archive_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        let base = std::env::temp_dir().join("strata-cache");
        Self {
            version: DEFAULT_VERSION.to_string(),
            max_memory_entries: 100,
            ttl: TtlConfig::default(),
            local_dir: base.join("local"),
            session_root: base.join("sessions"),
            archive_dir: base.join("archive"),
            archive_map_size: 256 * 1024 * 1024,
        }
    }
}

impl CacheConfig {
    /// Load configuration from a JSON file, falling back to defaults when
    /// the file is missing.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: CacheConfig = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            warn!("config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }
}
