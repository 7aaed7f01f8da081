//! Integration tests for cross-tier behavior: fallback reads, corruption
//! recovery, clearing, and instance lifecycles.

use serde::{Deserialize, Serialize};
use serde_json::json;
use strata_cache::store::file::FileTier;
use strata_cache::{
    entity_key, listing_key, CacheConfig, CacheEntry, SetOptions, Strategy, TierStore, TieredCache,
};
use tempfile::TempDir;

fn test_config(tmp: &TempDir) -> CacheConfig {
    CacheConfig {
        local_dir: tmp.path().join("local"),
        session_root: tmp.path().join("sessions"),
        archive_dir: tmp.path().join("archive"),
        archive_map_size: 10 * 1024 * 1024,
        ..CacheConfig::default()
    }
}

/// Run with `RUST_LOG=strata_cache=debug` to watch tier decisions.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[tokio::test]
async fn test_fallback_returns_fastest_live_tier() {
    let tmp = TempDir::new().unwrap();
    let cache = TieredCache::new(test_config(&tmp));

    cache.set("k", &"from-memory", SetOptions::default()).await;
    cache
        .set("k", &"from-local", SetOptions::strategy(Strategy::Local))
        .await;
    cache
        .set("k", &"from-archive", SetOptions::strategy(Strategy::Archive))
        .await;

    let got: Option<String> = cache.get_with_fallback("k", &Strategy::FALLBACK).await;
    assert_eq!(got.as_deref(), Some("from-memory"));

    cache.clear(Strategy::Memory).await;
    let got: Option<String> = cache.get_with_fallback("k", &Strategy::FALLBACK).await;
    assert_eq!(got.as_deref(), Some("from-local"));

    cache.clear(Strategy::Local).await;
    let got: Option<String> = cache.get_with_fallback("k", &Strategy::FALLBACK).await;
    assert_eq!(got.as_deref(), Some("from-archive"));
}

#[tokio::test]
async fn test_fallback_does_not_backfill_faster_tiers() {
    let tmp = TempDir::new().unwrap();
    let cache = TieredCache::new(test_config(&tmp));

    cache
        .set("deep", &42u32, SetOptions::strategy(Strategy::Archive))
        .await;

    let got: Option<u32> = cache.get_with_fallback("deep", &Strategy::FALLBACK).await;
    assert_eq!(got, Some(42));

    // The hit stayed where it was found.
    assert_eq!(cache.stats().await.memory_entries, 0);
    let memory: Option<u32> = cache.get("deep", Strategy::Memory).await;
    assert!(memory.is_none());

    // A fallback list without the archive misses entirely.
    let shallow: Option<u32> = cache
        .get_with_fallback("deep", &[Strategy::Memory, Strategy::Local])
        .await;
    assert!(shallow.is_none());
}

#[tokio::test]
async fn test_fallback_honors_caller_order() {
    let tmp = TempDir::new().unwrap();
    let cache = TieredCache::new(test_config(&tmp));

    cache.set("k", &"from-memory", SetOptions::default()).await;
    cache
        .set("k", &"from-session", SetOptions::strategy(Strategy::Session))
        .await;

    let got: Option<String> = cache
        .get_with_fallback("k", &[Strategy::Session, Strategy::Memory])
        .await;
    assert_eq!(got.as_deref(), Some("from-session"));
}

#[tokio::test]
async fn test_fallback_miss_everywhere_is_one_miss() {
    let tmp = TempDir::new().unwrap();
    let cache = TieredCache::new(test_config(&tmp));

    let got: Option<String> = cache.get_with_fallback("absent", &Strategy::FALLBACK).await;
    assert!(got.is_none());

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_corrupt_durable_entry_heals_on_read() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);
    let local_dir = config.local_dir.clone();
    let cache = TieredCache::new(config);

    cache
        .set("post:9", &"good data", SetOptions::strategy(Strategy::Local))
        .await;

    // Scribble over the entry file on disk.
    let files = FileTier::durable(local_dir);
    let path = files.entry_path("post:9");
    assert!(path.exists());
    std::fs::write(&path, "== definitely not base64 ==").unwrap();

    // The unreadable entry reads as a miss and is deleted.
    let got: Option<String> = cache.get("post:9", Strategy::Local).await;
    assert!(got.is_none());
    assert!(!path.exists(), "corrupt entry file should have been removed");

    // The tier keeps working for that key afterwards.
    cache
        .set("post:9", &"rewritten", SetOptions::strategy(Strategy::Local))
        .await;
    let got: Option<String> = cache.get("post:9", Strategy::Local).await;
    assert_eq!(got.as_deref(), Some("rewritten"));
}

#[tokio::test]
async fn test_out_of_range_timestamp_heals_on_read() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);
    let local_dir = config.local_dir.clone();
    let cache = TieredCache::new(config);

    // Plant a well-formed entry whose write time sits far outside any
    // real clock. It decodes cleanly, so only liveness can reject it.
    let files = FileTier::durable(local_dir);
    let entry = CacheEntry::new(json!("leftover"), i64::MIN, 60_000, "1.0.0".to_string());
    files.set("post:10", entry).await.unwrap();
    let path = files.entry_path("post:10");
    assert!(path.exists());

    // The read degrades to a miss and drops the entry.
    let got: Option<String> = cache.get("post:10", Strategy::Local).await;
    assert!(got.is_none());
    assert!(!path.exists(), "out-of-range entry should have been removed");
    assert_eq!(cache.stats().await.misses, 1);
}

#[tokio::test]
async fn test_clear_all_empties_every_tier() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let cache = TieredCache::new(test_config(&tmp));

    for strategy in Strategy::ALL {
        cache
            .set("wipe-me", &1u32, SetOptions::strategy(strategy))
            .await;
    }

    cache.clear_all().await;

    for strategy in Strategy::ALL {
        let got: Option<u32> = cache.get("wipe-me", strategy).await;
        assert!(got.is_none(), "entry survived clear_all in {strategy}");
    }
    assert_eq!(cache.stats().await.memory_entries, 0);
}

#[tokio::test]
async fn test_archive_and_local_survive_instance_restart() {
    let tmp = TempDir::new().unwrap();

    {
        let cache = TieredCache::new(test_config(&tmp));
        cache
            .set("kept:archive", &"a", SetOptions::strategy(Strategy::Archive))
            .await;
        cache
            .set("kept:local", &"l", SetOptions::strategy(Strategy::Local))
            .await;
        cache.set("kept:memory", &"m", SetOptions::default()).await;
    }

    // A fresh instance over the same directories sees the durable tiers
    // but not the old memory contents.
    let cache = TieredCache::new(test_config(&tmp));
    let archive: Option<String> = cache.get("kept:archive", Strategy::Archive).await;
    let local: Option<String> = cache.get("kept:local", Strategy::Local).await;
    let memory: Option<String> = cache.get("kept:memory", Strategy::Memory).await;
    assert_eq!(archive.as_deref(), Some("a"));
    assert_eq!(local.as_deref(), Some("l"));
    assert!(memory.is_none());
}

#[tokio::test]
async fn test_session_entries_are_invisible_to_other_instances() {
    let tmp = TempDir::new().unwrap();

    let first = TieredCache::new(test_config(&tmp));
    first
        .set("draft", &"mine", SetOptions::strategy(Strategy::Session))
        .await;

    let second = TieredCache::new(test_config(&tmp));
    let got: Option<String> = second.get("draft", Strategy::Session).await;
    assert!(got.is_none());

    // Each instance still round-trips its own session entries.
    second
        .set("draft", &"theirs", SetOptions::strategy(Strategy::Session))
        .await;
    let mine: Option<String> = first.get("draft", Strategy::Session).await;
    let theirs: Option<String> = second.get("draft", Strategy::Session).await;
    assert_eq!(mine.as_deref(), Some("mine"));
    assert_eq!(theirs.as_deref(), Some("theirs"));
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct ListingFilters {
    tag: String,
    page: u32,
}

#[tokio::test]
async fn test_key_factory_round_trip() {
    let tmp = TempDir::new().unwrap();
    let cache = TieredCache::new(test_config(&tmp));

    let post_key = entity_key("post", 42);
    cache.set(&post_key, &"a post", SetOptions::default()).await;

    let filters = ListingFilters {
        tag: "rust".to_string(),
        page: 1,
    };
    let list_key = listing_key("post", &filters);
    cache.set(&list_key, &vec![42u32, 43], SetOptions::default()).await;

    // Rebuilt keys find the same entries.
    let post: Option<String> = cache.get(&entity_key("post", 42), Strategy::Memory).await;
    assert_eq!(post.as_deref(), Some("a post"));

    let rebuilt = listing_key(
        "post",
        &ListingFilters {
            tag: "rust".to_string(),
            page: 1,
        },
    );
    assert_eq!(rebuilt, list_key);
    let listing: Option<Vec<u32>> = cache.get(&rebuilt, Strategy::Memory).await;
    assert_eq!(listing, Some(vec![42, 43]));

    // A different filter payload resolves to a different entry.
    let other = listing_key(
        "post",
        &ListingFilters {
            tag: "rust".to_string(),
            page: 2,
        },
    );
    let missing: Option<Vec<u32>> = cache.get(&other, Strategy::Memory).await;
    assert!(missing.is_none());
}
