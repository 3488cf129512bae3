//! Cache Store Module
//!
//! Concurrency wrapper around [`LruCache`]: one exclusive lock per store,
//! never shared across groups.

use std::collections::BTreeSet;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{ByteView, CacheStats, EvictionCallback, LruCache};

#[derive(Debug)]
struct Inner {
    lru: LruCache,
    stats: CacheStats,
}

impl Inner {
    fn put(&mut self, key: String, value: ByteView) {
        let evicted = self.lru.put(key, value);
        if evicted > 0 {
            debug!("Evicted {} entries to stay within {} bytes", evicted, self.lru.max_bytes());
            self.stats.record_evictions(evicted);
        }
    }
}

// == Store ==
/// Byte-budgeted store owned by exactly one group.
///
/// Every operation, reads included, runs inside the same critical section so
/// snapshots never observe a half-applied mutation.
#[derive(Debug)]
pub struct Store {
    inner: Mutex<Inner>,
}

impl Store {
    // == Constructor ==
    /// Creates a store with the given byte budget (0 = unbounded).
    pub fn new(max_bytes: usize) -> Self {
        Self::from_lru(LruCache::new(max_bytes))
    }

    /// Creates a store whose evictions are reported to `on_evicted`.
    pub fn with_eviction_callback(max_bytes: usize, on_evicted: EvictionCallback) -> Self {
        Self::from_lru(LruCache::with_eviction_callback(max_bytes, on_evicted))
    }

    fn from_lru(lru: LruCache) -> Self {
        let stats = CacheStats::new(lru.max_bytes());
        Self {
            inner: Mutex::new(Inner { lru, stats }),
        }
    }

    // == Get ==
    /// Looks up `key`, promoting it on a hit and recording the outcome.
    pub async fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock().await;
        let found = inner.lru.get(key);
        match found {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        found
    }

    // == Add ==
    /// Inserts or replaces one entry.
    pub async fn add(&self, key: String, value: ByteView) {
        let mut inner = self.inner.lock().await;
        inner.put(key, value);
    }

    // == Add Many ==
    /// Inserts a batch of entries under a single lock acquisition.
    ///
    /// Entries are applied in iteration order, so the last one ends up
    /// most-recently-used.
    pub async fn add_many<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, ByteView)>,
    {
        let mut inner = self.inner.lock().await;
        for (key, value) in entries {
            inner.put(key, value);
        }
    }

    // == Delete ==
    /// Removes `key`; returns whether it was present.
    pub async fn delete(&self, key: &str) -> bool {
        self.inner.lock().await.lru.delete(key)
    }

    // == Snapshots ==
    pub async fn len(&self) -> usize {
        self.inner.lock().await.lru.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.lru.is_empty()
    }

    /// Membership test without promotion or stats side effects.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.lru.contains(key)
    }

    pub async fn keys(&self) -> BTreeSet<String> {
        self.inner.lock().await.lru.keys()
    }

    /// Entries ordered most-recently-used first.
    pub async fn entries(&self) -> Vec<(String, ByteView)> {
        self.inner.lock().await.lru.entries()
    }

    /// Byte budget this store was created with.
    pub async fn max_bytes(&self) -> usize {
        self.inner.lock().await.lru.max_bytes()
    }

    // == Stats ==
    /// Returns current store statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        let mut stats = inner.stats.clone();
        stats.set_occupancy(inner.lru.len(), inner.lru.used_bytes());
        stats
    }
}
