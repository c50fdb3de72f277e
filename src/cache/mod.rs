//! Cache Module
//!
//! Provides the in-memory response cache with byte-bounded LRU eviction.

mod entry;
mod lru;
mod shared;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::{Handle, LruList};
pub use shared::ObjectCache;
pub use stats::CacheStats;
pub use store::{CacheStore, PutOutcome};

// == Public Constants ==
/// Default total payload bytes the cache may hold
pub const DEFAULT_MAX_CACHE_SIZE: usize = 1_049_000;

/// Default largest response that will be cached
pub const DEFAULT_MAX_OBJECT_SIZE: usize = 102_400;
