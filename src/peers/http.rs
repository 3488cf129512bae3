//! HTTP Peer Pool
//!
//! Consistent-hash routing over a set of peer base URLs, and a reqwest client
//! that fetches `GET {base}/cache/{group}/{key}` from the owning peer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::ByteView;
use crate::error::{CacheError, Result};
use crate::peers::{PeerFetcher, PeerPicker};
use crate::ring::HashRing;

// == HTTP Fetcher ==
/// Client for one remote peer.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base_url: String,
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher for the peer at `base_url` (e.g. `http://10.0.0.2:3000`).
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn value_url(&self, group: &str, key: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CacheError::PeerUnavailable(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                CacheError::PeerUnavailable(format!("{}: not a base URL", self.base_url))
            })?
            .pop_if_empty()
            .push("cache")
            .push(group)
            .push(key);
        Ok(url)
    }
}

#[async_trait]
impl PeerFetcher for HttpFetcher {
    async fn fetch(&self, group: &str, key: &str) -> Result<ByteView> {
        let url = self.value_url(group, key)?;
        let unavailable = |e: reqwest::Error| CacheError::PeerUnavailable(e.to_string());

        let response = self.client.get(url).send().await.map_err(unavailable)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CacheError::PeerUnavailable(format!(
                "{} returned {}: {}",
                self.base_url, status, body
            )));
        }

        let bytes = response.bytes().await.map_err(unavailable)?;
        Ok(ByteView::copy_from(&bytes))
    }
}

struct PoolState {
    ring: HashRing,
    fetchers: HashMap<String, Arc<HttpFetcher>>,
}

// == HTTP Pool ==
/// Peer picker backed by a hash ring of HTTP peers.
///
/// `self_addr` must be spelled exactly as it appears in the peer list, since
/// keys routed to it are served locally.
pub struct HttpPool {
    self_addr: String,
    replicas: usize,
    client: Client,
    state: RwLock<PoolState>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool with no peers; every key is local until
    /// [`set_peers`](Self::set_peers) is called.
    ///
    /// # Arguments
    /// * `self_addr` - This node's identity on the ring
    /// * `replicas` - Virtual points per peer (0 = default)
    /// * `timeout` - Upper bound on one remote fetch
    pub fn new(self_addr: impl Into<String>, replicas: usize, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("building peer client: {}", e)))?;
        let ring = HashRing::new(replicas, None);
        Ok(Self {
            self_addr: self_addr.into(),
            replicas: ring.replicas(),
            client,
            state: RwLock::new(PoolState {
                ring,
                fetchers: HashMap::new(),
            }),
        })
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    // == Set Peers ==
    /// Replaces the peer set and rebuilds the ring.
    pub async fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();
        let ring = HashRing::with_peers(peers.iter().cloned(), self.replicas, None);
        let fetchers = ring
            .peers()
            .iter()
            .map(|peer| {
                let fetcher = HttpFetcher::new(peer.clone(), self.client.clone());
                (peer.clone(), Arc::new(fetcher))
            })
            .collect();

        info!("[Server {}] Peer set updated: {:?}", self.self_addr, ring.peers());
        *self.state.write().await = PoolState { ring, fetchers };
    }

    // == Owner ==
    /// Returns the ring owner of `key`, which may be this node.
    pub async fn owner(&self, key: &str) -> Option<String> {
        self.state.read().await.ring.route(key).map(str::to_string)
    }

    pub async fn peers(&self) -> Vec<String> {
        self.state.read().await.ring.peers().iter().cloned().collect()
    }
}

#[async_trait]
impl PeerPicker for HttpPool {
    async fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        let state = self.state.read().await;
        let peer = state.ring.route(key)?;
        if peer == self.self_addr {
            return None;
        }
        debug!("[Server {}] Pick peer {} for key '{}'", self.self_addr, peer, key);
        state
            .fetchers
            .get(peer)
            .map(|fetcher| Arc::clone(fetcher) as Arc<dyn PeerFetcher>)
    }
}
