use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::{CacheError, CacheResult};
use crate::item::CacheItem;
use crate::traits::TagAwareCache;

/// Eviction policy for the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Least Recently Used - evicts the least recently accessed entry
    LRU,
    /// First In First Out - evicts the oldest entry
    FIFO,
}

/// Statistics for cache operations
#[derive(Debug)]
pub struct CacheStatistics {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    invalidations: AtomicU64,
}

impl CacheStatistics {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Get the number of cache hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get the number of cache misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get the number of evictions
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Get the number of items removed by deletion or tag invalidation
    pub fn invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    /// Calculate the cache hit rate (hits / (hits + misses))
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }
}

/// Entry metadata for cache management
#[derive(Debug, Clone)]
struct CacheEntry {
    item: CacheItem,
    inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(item: CacheItem) -> Self {
        Self {
            item,
            inserted_at: Utc::now(),
        }
    }

    fn is_expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        if self.item.is_expired_at(now) {
            return true;
        }
        ttl.is_some_and(|ttl| {
            now.signed_duration_since(self.inserted_at)
                .to_std()
                .ok()
                .is_some_and(|elapsed| elapsed > ttl)
        })
    }
}

/// Configuration for InMemoryTagAwareCache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache; zero stores nothing
    pub cache_size: usize,
    /// Eviction policy to use when cache is full
    pub eviction_policy: EvictionPolicy,
    /// Optional TTL applied on top of each item's own expiry
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    /// Create a new cache configuration
    pub fn new(cache_size: usize, eviction_policy: EvictionPolicy) -> Self {
        Self {
            cache_size,
            eviction_policy,
            ttl: None,
        }
    }

    /// Set the TTL for cache entries
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

#[derive(Debug, Default)]
struct Store {
    entries: HashMap<String, CacheEntry>,
    /// Access order tracking (for LRU and FIFO)
    access_order: VecDeque<String>,
    /// tag -> keys carrying it
    tag_index: HashMap<String, HashSet<String>>,
    /// Items buffered by save_deferred
    deferred: Vec<CacheItem>,
}

impl Store {
    fn remove(&mut self, key: &str) -> Option<CacheItem> {
        let entry = self.entries.remove(key)?;
        self.access_order.retain(|k| k != key);
        for tag in entry.item.tags() {
            if let Some(keys) = self.tag_index.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tag_index.remove(tag);
                }
            }
        }
        Some(entry.item)
    }

    fn touch(&mut self, key: &str) {
        self.access_order.retain(|k| k != key);
        self.access_order.push_back(key.to_string());
    }
}

/// A bounded, in-process tag-aware cache with LRU/FIFO eviction and TTL
#[derive(Debug)]
pub struct InMemoryTagAwareCache {
    store: RwLock<Store>,
    config: CacheConfig,
    statistics: CacheStatistics,
}

impl InMemoryTagAwareCache {
    /// Creates a new empty cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            config,
            statistics: CacheStatistics::new(),
        }
    }

    /// Returns the number of items currently in the cache
    pub fn len(&self) -> usize {
        self.store.read().entries.len()
    }

    /// Returns true if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.store.read().entries.is_empty()
    }

    /// Returns the number of items waiting for commit
    pub fn deferred_len(&self) -> usize {
        self.store.read().deferred.len()
    }

    /// Gets the cache statistics
    pub fn statistics(&self) -> &CacheStatistics {
        &self.statistics
    }

    /// Gets the cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Evicts all expired entries, returning how many were removed
    pub fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut store = self.store.write();
        let expired: Vec<String> = store
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.config.ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            store.remove(key);
            self.statistics.record_eviction();
        }
        expired.len()
    }

    fn lookup(&self, store: &mut Store, key: &str) -> Option<CacheItem> {
        let now = Utc::now();
        let expired = match store.entries.get(key) {
            Some(entry) => entry.is_expired(self.config.ttl, now),
            None => {
                self.statistics.record_miss();
                return None;
            }
        };

        if expired {
            store.remove(key);
            self.statistics.record_miss();
            return None;
        }

        if self.config.eviction_policy == EvictionPolicy::LRU {
            store.touch(key);
        }
        self.statistics.record_hit();
        store.entries.get(key).map(|entry| entry.item.clone().into_hit())
    }

    fn store_item(&self, store: &mut Store, item: CacheItem) -> CacheResult<bool> {
        if item.key().is_empty() {
            return Err(CacheError::InvalidKey(item.key().to_string()));
        }
        let key = item.key().to_string();
        store.remove(&key);

        // Saving an already-expired item only drops the previous value
        if item.is_expired_at(Utc::now()) {
            return Ok(true);
        }

        if self.config.cache_size == 0 {
            return Ok(false);
        }

        while store.entries.len() >= self.config.cache_size && !store.access_order.is_empty() {
            if let Some(oldest) = store.access_order.front().cloned() {
                store.remove(&oldest);
                self.statistics.record_eviction();
            }
        }

        for tag in item.tags() {
            store.tag_index.entry(tag.clone()).or_default().insert(key.clone());
        }
        store.access_order.push_back(key.clone());
        store.entries.insert(key, CacheEntry::new(item));
        Ok(true)
    }
}

impl TagAwareCache for InMemoryTagAwareCache {
    fn get_item(&self, key: &str) -> CacheResult<CacheItem> {
        let mut store = self.store.write();
        Ok(self
            .lookup(&mut store, key)
            .unwrap_or_else(|| CacheItem::miss(key)))
    }

    fn get_items(&self, keys: &[String]) -> CacheResult<Vec<CacheItem>> {
        let mut store = self.store.write();
        Ok(keys
            .iter()
            .map(|key| {
                self.lookup(&mut store, key)
                    .unwrap_or_else(|| CacheItem::miss(key.as_str()))
            })
            .collect())
    }

    fn has_item(&self, key: &str) -> CacheResult<bool> {
        let store = self.store.read();
        Ok(store
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.config.ttl, Utc::now())))
    }

    fn delete_item(&self, key: &str) -> CacheResult<bool> {
        if self.store.write().remove(key).is_some() {
            self.statistics.record_invalidation();
        }
        Ok(true)
    }

    fn delete_items(&self, keys: &[String]) -> CacheResult<bool> {
        let mut store = self.store.write();
        for key in keys {
            if store.remove(key).is_some() {
                self.statistics.record_invalidation();
            }
        }
        Ok(true)
    }

    fn invalidate_tags(&self, tags: &[String]) -> CacheResult<bool> {
        let mut store = self.store.write();
        for tag in tags {
            let keys: Vec<String> = store
                .tag_index
                .get(tag)
                .map(|keys| keys.iter().cloned().collect())
                .unwrap_or_default();
            for key in keys {
                if store.remove(&key).is_some() {
                    self.statistics.record_invalidation();
                }
            }
        }
        Ok(true)
    }

    fn clear(&self) -> CacheResult<bool> {
        let mut store = self.store.write();
        store.entries.clear();
        store.access_order.clear();
        store.tag_index.clear();
        store.deferred.clear();
        Ok(true)
    }

    fn save(&self, item: CacheItem) -> CacheResult<bool> {
        let mut store = self.store.write();
        self.store_item(&mut store, item)
    }

    fn save_deferred(&self, item: CacheItem) -> CacheResult<bool> {
        if item.key().is_empty() {
            return Err(CacheError::InvalidKey(item.key().to_string()));
        }
        self.store.write().deferred.push(item);
        Ok(true)
    }

    fn commit(&self) -> CacheResult<bool> {
        let mut store = self.store.write();
        let deferred = std::mem::take(&mut store.deferred);
        for item in deferred {
            self.store_item(&mut store, item)?;
        }
        Ok(true)
    }
}
