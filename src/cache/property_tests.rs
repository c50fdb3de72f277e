//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's capacity, ordering and payload guarantees.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::{CacheStore, PutOutcome};

// == Test Configuration ==
const TEST_MAX_CACHE_SIZE: usize = 1_000;
const TEST_MAX_OBJECT_SIZE: usize = 400;

// == Strategies ==
/// Generates request-target style keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_map(|s| format!("http://{}/", s))
}

/// Generates payloads, including empty and over-ceiling ones
fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=TEST_MAX_OBJECT_SIZE + 50)
}

/// Generates payloads that are always cacheable
fn cacheable_payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=TEST_MAX_OBJECT_SIZE)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, payload: Vec<u8> },
    Get { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), payload_strategy()).prop_map(|(key, payload)| CacheOp::Put { key, payload }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
    ]
}

/// Recomputes what the store should hold from its own view of keys.
fn assert_consistent(store: &CacheStore) -> Result<(), TestCaseError> {
    let keys = store.keys();
    prop_assert_eq!(keys.len(), store.len(), "List and index disagree");
    prop_assert!(
        store.total_bytes() <= TEST_MAX_CACHE_SIZE,
        "Cache holds {} bytes, capacity {}",
        store.total_bytes(),
        TEST_MAX_CACHE_SIZE
    );
    for key in &keys {
        prop_assert!(store.contains(key), "Listed key '{}' not indexed", key);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, total payload bytes stay within capacity
    // and the recency list matches the key index.
    #[test]
    fn prop_capacity_enforcement(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut store = CacheStore::new(TEST_MAX_CACHE_SIZE, TEST_MAX_OBJECT_SIZE);

        for op in ops {
            match op {
                CacheOp::Put { key, payload } => {
                    store.put(&key, &payload);
                }
                CacheOp::Get { key } => {
                    store.get(&key);
                }
            }
            assert_consistent(&store)?;
        }
    }

    // A cacheable put followed immediately by a get returns the same bytes.
    #[test]
    fn prop_put_then_get(key in key_strategy(), payload in cacheable_payload_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_CACHE_SIZE, TEST_MAX_OBJECT_SIZE);

        store.put(&key, &payload);
        prop_assert_eq!(store.get(&key), Some(payload));
    }

    // The first payload stored for a key is kept until it is evicted.
    #[test]
    fn prop_first_write_sticks(
        key in key_strategy(),
        first in cacheable_payload_strategy(),
        second in payload_strategy()
    ) {
        let mut store = CacheStore::new(TEST_MAX_CACHE_SIZE, TEST_MAX_OBJECT_SIZE);

        store.put(&key, &first);
        prop_assert_eq!(store.put(&key, &second), PutOutcome::AlreadyCached);
        prop_assert_eq!(store.get(&key), Some(first));
        prop_assert_eq!(store.len(), 1);
    }

    // Empty and over-ceiling payloads are never stored.
    #[test]
    fn prop_uncacheable_payloads_rejected(
        key in key_strategy(),
        extra in 1usize..200
    ) {
        let mut store = CacheStore::new(TEST_MAX_CACHE_SIZE, TEST_MAX_OBJECT_SIZE);

        prop_assert_eq!(store.put(&key, &[]), PutOutcome::Rejected);
        let oversized = vec![0u8; TEST_MAX_OBJECT_SIZE + extra];
        prop_assert_eq!(store.put(&key, &oversized), PutOutcome::Rejected);
        prop_assert!(store.get(&key).is_none());
    }
}

// Property tests for LRU eviction behavior
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // With equal-sized entries filling the cache, one more insertion evicts
    // exactly the least recently inserted entry.
    #[test]
    fn prop_lru_eviction_order(count in 2usize..10, size in 1usize..=100) {
        let capacity = count * size;
        let mut store = CacheStore::new(capacity, size);

        let keys: Vec<String> = (0..count).map(|i| format!("http://h/{}", i)).collect();
        for key in &keys {
            store.put(key, &vec![1u8; size]);
        }
        prop_assert_eq!(store.total_bytes(), capacity);

        let outcome = store.put("http://h/new", &vec![2u8; size]);
        prop_assert_eq!(outcome, PutOutcome::Inserted { evicted: 1 });

        prop_assert!(!store.contains(&keys[0]), "Oldest key should have been evicted");
        for key in keys.iter().skip(1) {
            prop_assert!(store.contains(key), "Key '{}' should survive", key);
        }
    }

    // A get between insertions promotes the key so a later eviction picks the
    // next least recent entry instead.
    #[test]
    fn prop_lru_access_tracking(count in 3usize..10, accessed in 0usize..100) {
        let size = 50;
        let mut store = CacheStore::new(count * size, size);

        let keys: Vec<String> = (0..count).map(|i| format!("http://h/{}", i)).collect();
        for key in &keys {
            store.put(key, &vec![1u8; size]);
        }

        let accessed = accessed % count;
        prop_assert!(store.get(&keys[accessed]).is_some());

        store.put("http://h/new", &vec![2u8; size]);

        let expected_evicted = if accessed == 0 { 1 } else { 0 };
        prop_assert!(store.contains(&keys[accessed]), "Accessed key must survive");
        prop_assert!(!store.contains(&keys[expected_evicted]));
    }

    // Eviction order matches a simple reference model of recency.
    #[test]
    fn prop_matches_reference_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut store = CacheStore::new(TEST_MAX_CACHE_SIZE, TEST_MAX_OBJECT_SIZE);
        // Most recent first, mirrors the store's recency list
        let mut model: Vec<(String, Vec<u8>)> = Vec::new();

        for op in ops {
            match op {
                CacheOp::Put { key, payload } => {
                    store.put(&key, &payload);
                    if let Some(pos) = model.iter().position(|(k, _)| *k == key) {
                        let entry = model.remove(pos);
                        model.insert(0, entry);
                    } else if !payload.is_empty() && payload.len() <= TEST_MAX_OBJECT_SIZE {
                        let mut used: usize = model.iter().map(|(_, v)| v.len()).sum();
                        while used + payload.len() > TEST_MAX_CACHE_SIZE {
                            if let Some((_, v)) = model.pop() {
                                used -= v.len();
                            }
                        }
                        model.insert(0, (key, payload));
                    }
                }
                CacheOp::Get { key } => {
                    let got = store.get(&key);
                    let expected = model.iter().position(|(k, _)| *k == key).map(|pos| {
                        let entry = model.remove(pos);
                        let payload = entry.1.clone();
                        model.insert(0, entry);
                        payload
                    });
                    prop_assert_eq!(got, expected);
                }
            }

            let model_keys: Vec<String> = model.iter().map(|(k, _)| k.clone()).collect();
            prop_assert_eq!(store.keys(), model_keys);
        }
    }
}

// == Property Test for Concurrent Operation Correctness ==
// Exercises the shared cache from many tasks at once

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // Concurrent readers only ever see a complete payload that was written for
    // that key, and the capacity bound holds once all tasks finish.
    #[test]
    fn prop_concurrent_operation_correctness(
        operations in prop::collection::vec(cache_op_strategy(), 10..60)
    ) {
        use std::sync::Arc;
        use crate::cache::ObjectCache;

        // Every payload ever put for a key is a legal read result
        let mut written: HashMap<String, Vec<Vec<u8>>> = HashMap::new();
        for op in &operations {
            if let CacheOp::Put { key, payload } = op {
                written.entry(key.clone()).or_default().push(payload.clone());
            }
        }
        let written = Arc::new(written);

        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let cache = Arc::new(ObjectCache::new(TEST_MAX_CACHE_SIZE, TEST_MAX_OBJECT_SIZE));

            let mut handles = vec![];
            for op in operations {
                let cache = Arc::clone(&cache);
                let written = Arc::clone(&written);

                handles.push(tokio::spawn(async move {
                    match op {
                        CacheOp::Put { key, payload } => {
                            cache.put(&key, &payload).await;
                            Ok::<_, String>(())
                        }
                        CacheOp::Get { key } => {
                            if let Some(payload) = cache.get(&key).await {
                                let legal = written
                                    .get(&key)
                                    .map(|all| all.contains(&payload))
                                    .unwrap_or(false);
                                if !legal {
                                    return Err(format!("Unexpected payload for key '{}'", key));
                                }
                            }
                            Ok(())
                        }
                    }
                }));
            }

            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
            }

            let stats = cache.stats().await;
            prop_assert!(stats.total_bytes <= TEST_MAX_CACHE_SIZE);

            let hit_rate = stats.hit_rate();
            prop_assert!((0.0..=1.0).contains(&hit_rate), "Hit rate out of range: {}", hit_rate);

            Ok(())
        })?;
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_example_sequence() {
        let mut store = CacheStore::new(TEST_MAX_CACHE_SIZE, TEST_MAX_OBJECT_SIZE);

        for key in ["a", "b", "c"] {
            store.put(key, &[0u8; 300]);
        }
        assert_eq!(store.total_bytes(), 900);

        store.put("d", &[0u8; 300]);
        assert_eq!(store.total_bytes(), 900);
        assert!(store.get("a").is_none());
        assert_eq!(store.keys(), ["d", "c", "b"]);
    }
}
