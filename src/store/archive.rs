//! Transactional archive tier backed by LMDB.
//!
//! The slowest and most durable tier. The environment is opened lazily on
//! first use and holds two named databases: `cache` for entries and
//! `meta` for the on-disk schema stamp. A schema stamp that does not
//! match this build drops the whole cache database on open; there is no
//! migration path for archived entries.
//!
//! LMDB calls are blocking, so every operation runs on the blocking
//! thread pool.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use heed::types::{SerdeJson, Str};
use heed::{Database, Env, EnvOpenOptions};
use serde_json::Value;
use tokio::sync::OnceCell;
use tokio::task;
use tracing::{debug, warn};

use crate::cache::entry::CacheEntry;
use crate::error::StoreError;
use crate::store::TierStore;

/// On-disk layout stamp. Bump when the entry encoding changes shape.
const SCHEMA_VERSION: u32 = 1;
const SCHEMA_KEY: &str = "schema_version";

const ENTRIES_DB: &str = "cache";
const META_DB: &str = "meta";

#[derive(Clone)]
struct ArchiveHandle {
    env: Env,
    entries: Database<Str, SerdeJson<CacheEntry<Value>>>,
}

/// LMDB-backed store. Cheap to construct; the environment and databases
/// are created by the first operation that needs them.
pub struct ArchiveTier {
    dir: PathBuf,
    map_size: usize,
    handle: OnceCell<ArchiveHandle>,
}

impl ArchiveTier {
    pub fn new(dir: PathBuf, map_size: usize) -> Self {
        Self {
            dir,
            map_size,
            handle: OnceCell::new(),
        }
    }

    async fn handle(&self) -> Result<&ArchiveHandle, StoreError> {
        self.handle
            .get_or_try_init(|| {
                let dir = self.dir.clone();
                let map_size = self.map_size;
                async move { task::spawn_blocking(move || open_archive(&dir, map_size)).await? }
            })
            .await
    }
}

/// Open or create the environment, gate on the schema stamp, and return
/// the entries database handle.
fn open_archive(dir: &Path, map_size: usize) -> Result<ArchiveHandle, StoreError> {
    std::fs::create_dir_all(dir)?;

    // Safety: the environment maps files we own under our own directory,
    // and nothing else in this process opens the same path.
    let env = unsafe {
        EnvOpenOptions::new()
            .map_size(map_size)
            .max_dbs(2)
            .open(dir)?
    };

    let mut wtxn = env.write_txn()?;
    let meta: Database<Str, SerdeJson<u32>> = env.create_database(&mut wtxn, Some(META_DB))?;
    let entries: Database<Str, SerdeJson<CacheEntry<Value>>> =
        env.create_database(&mut wtxn, Some(ENTRIES_DB))?;

    match meta.get(&wtxn, SCHEMA_KEY)? {
        Some(stored) if stored == SCHEMA_VERSION => {}
        stored => {
            if let Some(old) = stored {
                warn!(
                    found = old,
                    expected = SCHEMA_VERSION,
                    "archive schema mismatch, dropping archived entries"
                );
                entries.clear(&mut wtxn)?;
            }
            meta.put(&mut wtxn, SCHEMA_KEY, &SCHEMA_VERSION)?;
        }
    }
    wtxn.commit()?;

    debug!(dir = %dir.display(), "opened archive environment");
    Ok(ArchiveHandle { env, entries })
}

#[async_trait]
impl TierStore for ArchiveTier {
    fn name(&self) -> &'static str {
        "archive"
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry<Value>>, StoreError> {
        let handle = self.handle().await?.clone();
        let key = key.to_string();
        task::spawn_blocking(move || -> Result<Option<CacheEntry<Value>>, StoreError> {
            let rtxn = handle.env.read_txn()?;
            Ok(handle.entries.get(&rtxn, &key)?)
        })
        .await?
    }

    async fn set(&self, key: &str, entry: CacheEntry<Value>) -> Result<(), StoreError> {
        let handle = self.handle().await?.clone();
        let key = key.to_string();
        task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut wtxn = handle.env.write_txn()?;
            handle.entries.put(&mut wtxn, &key, &entry)?;
            wtxn.commit()?;
            Ok(())
        })
        .await?
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let handle = self.handle().await?.clone();
        let key = key.to_string();
        task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut wtxn = handle.env.write_txn()?;
            handle.entries.delete(&mut wtxn, &key)?;
            wtxn.commit()?;
            Ok(())
        })
        .await?
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let handle = self.handle().await?.clone();
        task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut wtxn = handle.env.write_txn()?;
            handle.entries.clear(&mut wtxn)?;
            wtxn.commit()?;
            Ok(())
        })
        .await?
    }
}
