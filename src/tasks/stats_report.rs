//! Cache Statistics Reporter
//!
//! Background task that periodically logs the object cache's counters.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::{CacheStats, ObjectCache};

/// Spawns a task that logs cache statistics every `interval_secs` seconds.
///
/// The returned handle is aborted during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ObjectCache::new(1_049_000, 102_400));
/// let stats_handle = spawn_stats_task(cache.clone(), 60);
/// // Later, during shutdown:
/// stats_handle.abort();
/// ```
pub fn spawn_stats_task(cache: Arc<ObjectCache>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!("Starting cache stats task with interval of {} seconds", interval.as_secs());

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            log_stats(&cache).await;
        }
    })
}

/// Logs one statistics snapshot and returns it.
pub async fn log_stats(cache: &ObjectCache) -> CacheStats {
    let stats = cache.stats().await;
    info!(
        entries = stats.total_entries,
        bytes = stats.total_bytes,
        hits = stats.hits,
        misses = stats.misses,
        insertions = stats.insertions,
        evictions = stats.evictions,
        rejected = stats.rejected,
        hit_rate = stats.hit_rate(),
        "Cache stats"
    );
    stats
}
