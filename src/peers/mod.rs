//! Peer Module
//!
//! Capabilities a group uses to reach the rest of the cluster, plus their
//! HTTP implementation.
//!
//! # Capabilities
//! - [`PeerPicker`]: decides which remote peer, if any, owns a key
//! - [`PeerFetcher`]: asks one remote peer for a key in a group

mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::ByteView;
use crate::error::Result;

pub use http::{HttpFetcher, HttpPool};

// == Peer Picker ==
/// Routes keys to the remote peer that owns them.
#[async_trait]
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or `None` when the local node owns `key` or
    /// no peers are known.
    async fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;
}

// == Peer Fetcher ==
/// Fetches a value from one remote peer.
///
/// Any failure is reported as [`CacheError::PeerUnavailable`](crate::error::CacheError)
/// and treated by the caller as "peer down", never as fatal.
#[async_trait]
pub trait PeerFetcher: Send + Sync {
    async fn fetch(&self, group: &str, key: &str) -> Result<ByteView>;
}
