//! Cache Statistics Module
//!
//! Tracks store metrics (hits, misses, evictions, bytes) and per-group load
//! counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Store metrics, updated under the store lock.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of failed lookups
    pub misses: u64,
    /// Number of entries evicted to satisfy the byte budget
    pub evictions: u64,
    /// Current number of entries
    pub total_entries: usize,
    /// Bytes currently accounted for
    pub used_bytes: usize,
    /// Byte budget, 0 = unbounded
    pub max_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Update Occupancy ==
    pub fn set_occupancy(&mut self, entries: usize, used_bytes: usize) {
        self.total_entries = entries;
        self.used_bytes = used_bytes;
    }
}

// == Load Counters ==
/// Lock-free counters for the load paths of a group.
#[derive(Debug, Default)]
pub struct LoadCounters {
    local_loads: AtomicU64,
    peer_loads: AtomicU64,
    peer_failures: AtomicU64,
}

impl LoadCounters {
    pub fn record_local_load(&self) {
        self.local_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_load(&self) {
        self.peer_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_failure(&self) {
        self.peer_failures.fetch_add(1, Ordering::Relaxed);
    }
}

// == Group Stats ==
/// Point-in-time statistics for one group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStats {
    pub group: String,
    #[serde(flatten)]
    pub cache: CacheStats,
    pub hit_rate: f64,
    /// Values produced by the local data-loading callback
    pub local_loads: u64,
    /// Values fetched from the owning peer
    pub peer_loads: u64,
    /// Remote fetches that failed and fell back to a local load
    pub peer_failures: u64,
}

impl GroupStats {
    pub fn new(group: impl Into<String>, cache: CacheStats, loads: &LoadCounters) -> Self {
        Self {
            group: group.into(),
            hit_rate: cache.hit_rate(),
            cache,
            local_loads: loads.local_loads.load(Ordering::Relaxed),
            peer_loads: loads.peer_loads.load(Ordering::Relaxed),
            peer_failures: loads.peer_failures.load(Ordering::Relaxed),
        }
    }
}
