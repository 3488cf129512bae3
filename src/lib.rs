//! Meshcache - A distributed read-through cache
//!
//! Named groups of byte-budgeted LRU caches, sharded across nodes with a
//! consistent hash ring. Concurrent misses for a key are coalesced into one
//! load, served by the owning peer or by the group's local data source.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod flight;
pub mod group;
pub mod models;
pub mod peers;
pub mod persistence;
pub mod ring;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Getter, Group, Registry};
pub use peers::{HttpPool, PeerFetcher, PeerPicker};
pub use tasks::spawn_snapshot_task;
