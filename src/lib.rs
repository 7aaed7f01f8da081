//! strata-cache: a tiered process-local cache.
//!
//! Four storage strategies sit behind one facade:
//!
//! - **memory**: bounded in-process LRU, fastest, lost on exit
//! - **local**: durable file store with obfuscated payloads
//! - **session**: file store scoped to one cache instance
//! - **archive**: transactional LMDB store for long-lived entries
//!
//! Every entry carries a TTL and a version stamp. Reads return only live
//! entries and eagerly drop the rest; expiry is otherwise lazy, with no
//! background sweeper. All operations are best-effort: the facade never
//! surfaces storage errors, because a cache miss must always be
//! recoverable by recomputing the value.
//!
//! # Example
//!
//! ```no_run
//! use strata_cache::{CacheConfig, SetOptions, Strategy, TieredCache};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cache = TieredCache::new(CacheConfig::default());
//!
//! let key = strata_cache::entity_key("article", 42);
//! cache.set(&key, &"cached body", SetOptions::default()).await;
//!
//! let body: Option<String> = cache.get_with_fallback(&key, &Strategy::FALLBACK).await;
//! assert_eq!(body.as_deref(), Some("cached body"));
//! # }
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod keys;
pub mod store;

pub use cache::entry::CacheEntry;
pub use cache::tiered::{CacheStats, SetOptions, TieredCache};
pub use config::{CacheConfig, TtlConfig, DEFAULT_VERSION};
pub use error::StoreError;
pub use keys::{entity_key, listing_key, KeyBuilder};
pub use store::{Strategy, TierStore};
