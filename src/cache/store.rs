//! Cache Store Module
//!
//! Main cache engine combining a HashMap index with the LRU list and lazy TTL
//! expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use chrono::TimeDelta;
use tracing::{debug, info};

use crate::cache::entry::{current_time, deadline};
use crate::cache::{CacheStats, Entry, LruList};
use crate::config::CacheConfig;

// == LRU Cache ==
/// Bounded key-value cache with LRU eviction and optional per-entry TTL.
///
/// Every operation is O(1) amortized. Expired entries are only dropped when a
/// read observes them; there is no background sweep.
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Key to list handle
    index: HashMap<K, usize>,
    /// Recency order, most recent first
    list: LruList<K, V>,
    stats: CacheStats,
    /// Maximum number of entries retained, 0 = retain nothing
    capacity: usize,
    /// TTL applied when `set` is called without one
    default_ttl: Option<TimeDelta>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// A zero or negative capacity is accepted and yields a cache that never
    /// retains anything.
    pub fn new(capacity: i64) -> Self {
        Self {
            index: HashMap::new(),
            list: LruList::new(),
            stats: CacheStats::new(),
            capacity: normalize_capacity(capacity),
            default_ttl: None,
        }
    }

    /// Creates a cache whose entries expire after `ttl` unless `set` is given
    /// an explicit TTL.
    pub fn with_default_ttl(capacity: i64, ttl: TimeDelta) -> Self {
        Self {
            default_ttl: Some(ttl),
            ..Self::new(capacity)
        }
    }

    /// Creates a cache from loaded configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut cache = Self::new(config.capacity);
        cache.default_ttl = config.default_ttl();
        info!(
            "Cache initialized: capacity={}, default_ttl_ms={:?}",
            cache.capacity, config.default_ttl_ms
        );
        cache
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let now = current_time();
        if self.list.entry(idx).is_some_and(|entry| entry.is_expired_at(now)) {
            self.stats.record_miss();
            self.discard(idx);
            debug!("Dropped expired entry on read, {} entries left", self.len());
            return None;
        }

        self.stats.record_hit();
        self.list.move_to_front(idx);
        self.list.entry(idx).and_then(Entry::value)
    }

    // == Set ==
    /// Stores a key-value pair with an optional TTL and returns the value.
    ///
    /// If the key already exists, its value and expiration are replaced in
    /// place. Otherwise the entry is inserted and, if the cache is now over
    /// capacity, the least recently used entry is evicted.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Time to live, uses the default TTL if None. Negative values
    ///   store an already-expired entry.
    pub fn set(&mut self, key: K, value: V, ttl: Option<TimeDelta>) -> V
    where
        V: Clone,
    {
        self.stats.record_set();
        let expires_at = ttl
            .or(self.default_ttl)
            .map(|ttl| deadline(current_time(), ttl));

        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.list.entry_mut(idx) {
                entry.value = Some(value.clone());
                entry.expires_at = expires_at;
            }
            self.list.move_to_front(idx);
            return value;
        }

        let idx = self.list.push_front(key.clone(), value.clone(), expires_at);
        self.index.insert(key, idx);

        if self.index.len() > self.capacity {
            self.evict_lru();
        }

        value
    }

    // == Remove ==
    /// Removes an entry by key. Absent keys are ignored.
    pub fn remove<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(idx) = self.index.remove(key) {
            self.list.remove(idx);
        }
    }

    // == Clear ==
    /// Removes every entry. Statistics are kept.
    pub fn clear(&mut self) {
        let dropped = self.index.len();
        self.index.clear();
        self.list.clear();
        debug!("Cache cleared: dropped {} entries", dropped);
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Runs only when called. Purged entries count neither as misses nor as
    /// evictions.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = current_time();
        let expired: Vec<usize> = self
            .list
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(idx, _)| idx)
            .collect();

        let count = expired.len();
        for idx in expired {
            self.discard(idx);
        }

        if count > 0 {
            debug!("Purged {} expired entries", count);
        }
        count
    }

    // == Peek ==
    /// Returns a live value without touching recency or statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = current_time();
        self.live_entry(key)
            .filter(|entry| !entry.is_expired_at(now))
            .and_then(Entry::value)
    }

    /// Checks whether a live entry exists for the key. No side effects.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.peek(key).is_some()
    }

    /// Returns the remaining TTL for a key.
    ///
    /// None if the key is absent or never expires; zero if it has expired but
    /// has not been collected yet.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<TimeDelta>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_entry(key)
            .and_then(|entry| entry.ttl_remaining_at(current_time()))
    }

    /// Returns the entry the next eviction would remove.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let entry = self.list.entry(self.list.back()?)?;
        Some((entry.key()?, entry.value()?))
    }

    // == Keys ==
    /// Returns the keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.list
            .iter()
            .filter_map(|(_, entry)| entry.key().cloned())
            .collect()
    }

    /// Iterates entries from most to least recently used, expired ones
    /// included. Does not touch recency or statistics.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list
            .iter()
            .filter_map(|(_, entry)| Some((entry.key()?, entry.value()?)))
    }

    // == Stats ==
    /// Returns a snapshot of the cumulative counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Option<TimeDelta> {
        self.default_ttl
    }

    fn live_entry<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let &idx = self.index.get(key)?;
        self.list.entry(idx)
    }

    /// Unlinks an entry and drops its key from the index.
    fn discard(&mut self, idx: usize) -> Option<(K, V)> {
        let (key, value) = self.list.remove(idx)?;
        self.index.remove(&key);
        Some((key, value))
    }

    // == Evict ==
    /// Evicts the entry adjacent to the tail sentinel.
    fn evict_lru(&mut self) {
        let Some(idx) = self.list.back() else {
            return;
        };
        if self.discard(idx).is_some() {
            self.stats.record_eviction();
            debug!(
                "Evicted least recently used entry (capacity={})",
                self.capacity
            );
        }
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Maps any signed capacity onto the number of entries retained.
fn normalize_capacity(capacity: i64) -> usize {
    if capacity <= 0 {
        0
    } else {
        usize::try_from(capacity).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Panics unless the index and the list describe the same set of entries.
    pub(crate) fn check_invariants(&self) {
        self.list.assert_consistent();
        assert_eq!(self.index.len(), self.list.len(), "index and list sizes differ");
        for (idx, entry) in self.list.iter() {
            let key = entry.key().expect("linked entry without key");
            assert_eq!(self.index.get(key), Some(&idx), "index out of sync for {key:?}");
        }
        assert!(
            self.list.slots() <= self.capacity.saturating_add(3),
            "arena grew past capacity"
        );
    }
}
