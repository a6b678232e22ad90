//! Integration tests for the public cache API
//!
//! Exercises the scenarios a host embedding the cache depends on: eviction
//! order, zero capacity, lazy expiration, statistics and configuration.

use std::collections::HashSet;
use std::sync::Once;

use lru_ttl_cache::{CacheConfig, CacheStats, ConfigError, LruCache, TimeDelta};

static INIT: Once = Once::new();

/// Routes library logs to the test harness output.
fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("lru_ttl_cache=debug"))
            .with_test_writer()
            .try_init();
    });
}

fn key_set(cache: &LruCache<i32, i32>) -> HashSet<i32> {
    cache.keys().into_iter().collect()
}

// == Eviction Scenarios ==

#[test]
fn test_read_protects_entry_from_eviction() {
    init_tracing();
    let mut cache = LruCache::new(2);

    cache.set(1, 1, None);
    cache.set(2, 2, None);
    assert_eq!(cache.get(&1), Some(&1));
    cache.set(3, 3, None);

    assert_eq!(cache.keys(), vec![3, 1]);
    assert_eq!(cache.get(&2), None);
}

#[test]
fn test_sequential_inserts_keep_newest() {
    init_tracing();
    let mut cache = LruCache::new(2);

    for i in 1..=4 {
        cache.set(i, i, None);
    }

    assert_eq!(key_set(&cache), HashSet::from([3, 4]));
    assert_eq!(cache.stats().evictions, 2);
}

#[test]
fn test_capacity_one_keeps_last_insert() {
    init_tracing();
    let mut cache = LruCache::new(1);

    cache.set(1, 1, None);
    cache.set(2, 2, None);
    assert_eq!(cache.get(&2), Some(&2));
    cache.set(3, 3, None);

    assert_eq!(key_set(&cache), HashSet::from([3]));
}

#[test]
fn test_non_positive_capacity_stores_nothing() {
    init_tracing();
    for capacity in [0, -1, i64::MIN] {
        let mut cache = LruCache::new(capacity);

        assert_eq!(cache.set(1, 1, None), 1);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
    }
}

// == Expiration ==

#[test]
fn test_negative_ttl_expires_lazily() {
    init_tracing();
    let mut cache = LruCache::new(10);

    cache.set(1, 1, Some(TimeDelta::milliseconds(-1000)));
    assert_eq!(cache.len(), 1);

    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_expired_entry_frees_capacity_on_read() {
    init_tracing();
    let mut cache = LruCache::new(2);

    cache.set(1, 1, Some(TimeDelta::milliseconds(-1)));
    cache.set(2, 2, None);
    assert_eq!(cache.get(&1), None);

    // Slot freed by expiration, so no eviction is needed
    cache.set(3, 3, None);
    assert_eq!(cache.keys(), vec![3, 2]);
    assert_eq!(cache.stats().evictions, 0);
}

// == Statistics ==

#[test]
fn test_stats_snapshot_and_serialization() {
    init_tracing();
    let mut cache = LruCache::new(2);

    cache.set("a".to_string(), 1, None);
    cache.set("b".to_string(), 2, None);
    cache.get("a");
    cache.get("missing");
    cache.set("c".to_string(), 3, None);

    let stats = cache.stats();
    assert_eq!(
        stats,
        CacheStats {
            hits: 1,
            misses: 1,
            evictions: 1,
            sets: 3,
        }
    );
    assert_eq!(stats.hit_rate(), 0.5);

    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "hits": 1, "misses": 1, "evictions": 1, "sets": 3 })
    );
}

#[test]
fn test_stats_survive_clear() {
    init_tracing();
    let mut cache = LruCache::new(5);

    cache.set(1, 1, None);
    cache.get(&1);
    cache.clear();
    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.stats().sets, 1);
}

// == Configuration ==

#[test]
fn test_cache_from_config() {
    init_tracing();
    let config = CacheConfig::from_lookup(|var| match var {
        "LRU_CAPACITY" => Some("2".to_string()),
        "LRU_DEFAULT_TTL_MS" => Some("-500".to_string()),
        _ => None,
    })
    .unwrap();
    let mut cache = LruCache::from_config(&config);

    cache.set(1, 1, None);
    cache.set(2, 2, Some(TimeDelta::seconds(60)));

    assert_eq!(cache.capacity(), 2);
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.get(&2), Some(&2));
}

#[test]
fn test_config_rejects_garbage() {
    let result = CacheConfig::from_lookup(|var| {
        (var == "LRU_DEFAULT_TTL_MS").then(|| "soon".to_string())
    });

    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { var: "LRU_DEFAULT_TTL_MS", .. })
    ));
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: CacheConfig = serde_json::from_str(r#"{ "default_ttl_ms": 250 }"#).unwrap();

    assert_eq!(config.capacity, 1000);
    assert_eq!(config.default_ttl(), Some(TimeDelta::milliseconds(250)));
}

#[test]
fn test_default_cache_uses_default_config() {
    init_tracing();
    let cache: LruCache<String, String> = LruCache::default();

    assert_eq!(cache.capacity(), 1000);
    assert_eq!(cache.default_ttl(), None);
}
