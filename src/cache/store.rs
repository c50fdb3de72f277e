//! Cache Store Module
//!
//! Byte-bounded object store combining a key index with LRU recency tracking.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Handle, LruList};

// == Put Outcome ==
/// What a [`CacheStore::put`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// A new entry was stored after evicting `evicted` older entries.
    Inserted { evicted: usize },
    /// The key was already cached; it was promoted and its payload kept.
    AlreadyCached,
    /// The payload was empty or above the object ceiling and was not stored.
    Rejected,
}

// == Cache Store ==
/// Response cache with strict global LRU eviction.
///
/// Invariants held after every operation:
/// - the sum of payload sizes never exceeds `max_cache_size`
/// - no payload is larger than `max_object_size`
/// - every indexed key has exactly one linked entry
#[derive(Debug)]
pub struct CacheStore {
    /// Key -> recency list handle
    index: HashMap<String, Handle>,
    /// Entries ordered most to least recently used
    lru: LruList<CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Sum of payload sizes currently held
    total_bytes: usize,
    /// Capacity in payload bytes
    max_cache_size: usize,
    /// Largest single payload that may be cached
    max_object_size: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_cache_size` - Total payload bytes the cache can hold
    /// * `max_object_size` - Largest single payload that may be cached
    pub fn new(max_cache_size: usize, max_object_size: usize) -> Self {
        Self {
            index: HashMap::new(),
            lru: LruList::new(),
            stats: CacheStats::new(),
            total_bytes: 0,
            max_cache_size,
            max_object_size,
        }
    }

    // == Get ==
    /// Looks up a cached response by its exact key.
    ///
    /// A hit promotes the entry to most recently used and returns a copy of
    /// the payload that the caller owns outright.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let Some(&handle) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        self.lru.touch(handle);
        let payload = self.lru.get(handle).map(|entry| entry.payload().to_vec());
        match payload {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        payload
    }

    // == Put ==
    /// Stores a response under `key` unless one is already cached.
    ///
    /// An existing entry is promoted and keeps its original payload. Empty
    /// payloads and payloads above the object ceiling are ignored. Otherwise
    /// least recently used entries are evicted until the new payload fits.
    pub fn put(&mut self, key: &str, payload: &[u8]) -> PutOutcome {
        if let Some(&handle) = self.index.get(key) {
            self.lru.touch(handle);
            return PutOutcome::AlreadyCached;
        }

        let len = payload.len();
        if len == 0 || len > self.max_object_size || len > self.max_cache_size {
            self.stats.record_rejection();
            return PutOutcome::Rejected;
        }

        let mut evicted = 0;
        while self.total_bytes + len > self.max_cache_size {
            let Some(victim) = self.lru.evict_oldest() else {
                break;
            };
            self.index.remove(&victim.key);
            self.total_bytes -= victim.size();
            self.stats.record_eviction();
            evicted += 1;
            debug!(
                key = %victim.key,
                size = victim.size(),
                age_ms = victim.age_ms(),
                "Evicted cache entry"
            );
        }

        let handle = self.lru.push_front(CacheEntry::new(key, payload));
        self.index.insert(key.to_string(), handle);
        self.total_bytes += len;
        self.stats.record_insertion();

        PutOutcome::Inserted { evicted }
    }

    // == Contains ==
    /// Checks for a key without touching recency or statistics.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Keys ==
    /// Cached keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.lru.iter().map(|entry| entry.key.clone()).collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.index.len(), self.total_bytes);
        stats
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Payload bytes currently held.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn max_cache_size(&self) -> usize {
        self.max_cache_size
    }

    pub fn max_object_size(&self) -> usize {
        self.max_object_size
    }
}
