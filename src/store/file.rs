//! File-backed tiers: durable (`local`) and session-scoped (`session`).
//!
//! One file per key under the tier directory, named by the hex SHA-256
//! digest of the key with a `cache_` namespace prefix. The durable
//! variant passes serialized entries through the reversible transform in
//! [`crate::codec`]; the session variant stores plain JSON.
//!
//! These stores block: every operation completes in one synchronous read
//! or write. Callers that need a non-blocking tier use the archive.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::cache::entry::CacheEntry;
use crate::codec;
use crate::error::StoreError;
use crate::store::TierStore;

/// Filename prefix namespacing our entry files within a directory.
const FILE_PREFIX: &str = "cache_";

/// How a tier encodes serialized entries on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadEncoding {
    /// Plain JSON text.
    Plain,
    /// JSON passed through the reversible obfuscation transform.
    Obfuscated,
}

/// A file-per-key store rooted at one directory.
pub struct FileTier {
    dir: PathBuf,
    encoding: PayloadEncoding,
    label: &'static str,
}

impl FileTier {
    /// Durable store with obfuscated payloads.
    pub fn durable(dir: PathBuf) -> Self {
        Self {
            dir,
            encoding: PayloadEncoding::Obfuscated,
            label: "local",
        }
    }

    /// Session-scoped store with plain payloads.
    pub fn session(dir: PathBuf) -> Self {
        Self {
            dir,
            encoding: PayloadEncoding::Plain,
            label: "session",
        }
    }

    /// Directory backing this tier. Created lazily by the first write.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a key: `cache_<hex sha-256>.entry` under the tier
    /// directory. Hashing keeps arbitrary keys filesystem-safe.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.dir.join(format!("{FILE_PREFIX}{digest}.entry"))
    }
}

#[async_trait]
impl TierStore for FileTier {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry<Value>>, StoreError> {
        let path = self.entry_path(key);
        let stored = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let json = match self.encoding {
            PayloadEncoding::Plain => stored,
            PayloadEncoding::Obfuscated => codec::deobfuscate(&stored)?,
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    async fn set(&self, key: &str, entry: CacheEntry<Value>) -> Result<(), StoreError> {
        let json = serde_json::to_string(&entry)?;
        let payload = match self.encoding {
            PayloadEncoding::Plain => json,
            PayloadEncoding::Obfuscated => codec::obfuscate(&json),
        };

        fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(key);
        fs::write(&path, payload)?;
        debug!(tier = self.label, key, path = %path.display(), "wrote entry file");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let dir = match fs::read_dir(&self.dir) {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        for dir_entry in dir {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name();
            let is_ours = name
                .to_str()
                .map(|n| n.starts_with(FILE_PREFIX))
                .unwrap_or(false);
            if is_ours && dir_entry.file_type()?.is_file() {
                fs::remove_file(dir_entry.path())?;
            }
        }
        Ok(())
    }
}
