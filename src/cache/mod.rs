//! Cache Module
//!
//! Byte-budgeted LRU storage used by every group.

mod byteview;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use byteview::ByteView;
pub use lru::{entry_cost, EvictionCallback, LruCache};
pub use stats::{CacheStats, GroupStats, LoadCounters};
pub use store::Store;
