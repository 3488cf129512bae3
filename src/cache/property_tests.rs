//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check byte accounting and recency order of the LRU cache
//! over arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::{entry_cost, ByteView, LruCache};

// == Strategies ==
/// Small key alphabet so sequences revisit keys often.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]{1,3}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..48)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: Vec<u8> },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // used_bytes always equals the summed cost of held entries and never
    // exceeds a non-zero budget.
    #[test]
    fn prop_size_invariant(
        max_bytes in prop_oneof![Just(0usize), 1usize..128],
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut lru = LruCache::new(max_bytes);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => { lru.put(key, ByteView::from(value)); }
                CacheOp::Get { key } => { lru.get(&key); }
                CacheOp::Delete { key } => { lru.delete(&key); }
            }

            let total: usize = lru.entries().iter().map(|(k, v)| entry_cost(k, v)).sum();
            prop_assert_eq!(lru.used_bytes(), total);
            prop_assert!(max_bytes == 0 || lru.used_bytes() <= max_bytes);
            prop_assert_eq!(lru.entries().len(), lru.len());
        }
    }

    // With an unbounded budget the cache behaves like a map.
    #[test]
    fn prop_unbounded_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut lru = LruCache::new(0);
        let mut model: HashMap<String, Vec<u8>> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    model.insert(key.clone(), value.clone());
                    lru.put(key, ByteView::from(value));
                }
                CacheOp::Get { key } => {
                    let got = lru.get(&key).map(|v| v.to_vec());
                    prop_assert_eq!(got.as_ref(), model.get(&key));
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(lru.delete(&key), model.remove(&key).is_some());
                }
            }
        }
        prop_assert_eq!(lru.len(), model.len());
    }

    // Put then get returns the same bytes whenever the entry fits the budget.
    #[test]
    fn prop_roundtrip(key in key_strategy(), value in value_strategy()) {
        let mut lru = LruCache::new(1024);
        lru.put(key.clone(), ByteView::from(value.clone()));
        prop_assert_eq!(lru.get(&key).map(|v| v.to_vec()), Some(value));
    }

    // Evictions always take the least recently touched keys first.
    #[test]
    fn prop_eviction_follows_recency(
        touches in prop::collection::vec(0usize..6, 0..20),
        extra in 1usize..6
    ) {
        // Six fixed-size entries fill the budget exactly.
        let keys: Vec<String> = (0..6).map(|i| format!("k{}", i)).collect();
        let cost = entry_cost(&keys[0], &ByteView::from("vv"));
        let mut lru = LruCache::new(cost * keys.len());
        let mut recency: Vec<String> = Vec::new();

        for key in &keys {
            lru.put(key.clone(), ByteView::from("vv"));
            recency.push(key.clone());
        }
        for &i in &touches {
            lru.get(&keys[i]);
            recency.retain(|k| k != &keys[i]);
            recency.push(keys[i].clone());
        }
        for n in 0..extra {
            lru.put(format!("n{}", n), ByteView::from("vv"));
        }

        // The `extra` least recent keys are gone, the rest survive.
        for (pos, key) in recency.iter().enumerate() {
            prop_assert_eq!(lru.contains(key), pos >= extra, "key {}", key);
        }
    }
}
