//! Shared Object Cache
//!
//! The cache handle given to every connection task. All access goes through a
//! single mutex around the [`CacheStore`]; the guard is only held for index and
//! list updates plus payload copies, never across socket I/O.

use tokio::sync::Mutex;

use crate::cache::{CacheStats, CacheStore, PutOutcome};

// == Object Cache ==
/// Thread-safe LRU object cache.
#[derive(Debug)]
pub struct ObjectCache {
    store: Mutex<CacheStore>,
}

impl ObjectCache {
    /// Creates an empty cache bounded by `max_cache_size` payload bytes.
    pub fn new(max_cache_size: usize, max_object_size: usize) -> Self {
        Self::from_store(CacheStore::new(max_cache_size, max_object_size))
    }

    pub fn from_store(store: CacheStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Returns a caller-owned copy of the payload cached under `key`.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.store.lock().await.get(key)
    }

    /// Caches `payload` under `key`; see [`CacheStore::put`].
    pub async fn put(&self, key: &str, payload: &[u8]) -> PutOutcome {
        self.store.lock().await.put(key, payload)
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    /// Ceiling above which responses are relayed but never cached.
    pub async fn max_object_size(&self) -> usize {
        self.store.lock().await.max_object_size()
    }
}
