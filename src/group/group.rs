//! Group Module
//!
//! A named cache namespace: local store, load coalescing, peer routing and
//! the data-source fallback.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::cache::{ByteView, GroupStats, LoadCounters, Store};
use crate::error::{CacheError, Result};
use crate::flight::Flight;
use crate::group::{Getter, GroupSnapshot};
use crate::peers::{PeerFetcher, PeerPicker};

// == Group ==
/// A named read-through cache.
///
/// A read checks the local store first. On a miss, one coalesced load per key
/// either fetches the value from the owning peer or runs the local
/// [`Getter`]. Only locally loaded values are written back; values served by
/// a remote owner stay on that owner.
pub struct Group {
    name: String,
    getter: Option<Arc<dyn Getter>>,
    store: Store,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: Flight<ByteView>,
    loads: LoadCounters,
}

impl Group {
    // == Constructor ==
    /// Creates a group with a byte budget (0 = unbounded) and an optional
    /// data source. Without a data source, misses no peer can serve fail
    /// with `NotFound`.
    pub fn new(name: impl Into<String>, max_bytes: usize, getter: Option<Arc<dyn Getter>>) -> Self {
        Self::with_store(name, Store::new(max_bytes), getter)
    }

    /// Creates a group around a preconfigured store.
    pub fn with_store(
        name: impl Into<String>,
        store: Store,
        getter: Option<Arc<dyn Getter>>,
    ) -> Self {
        Self {
            name: name.into(),
            getter,
            store,
            peers: OnceLock::new(),
            loader: Flight::new(),
            loads: LoadCounters::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Binds the peer-routing capability.
    ///
    /// # Panics
    /// If called more than once for the same group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once for group '{}'", self.name);
        }
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required".to_string()));
        }
        if let Some(value) = self.store.get(key).await {
            debug!("[{}] hit '{}'", self.name, key);
            return Ok(value);
        }
        self.load(key).await
    }

    // == Load ==
    /// Coalesced miss path: owning peer first, local data source as fallback.
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.loader
            .run(key, || async {
                if let Some(peer) = self.pick_peer(key).await {
                    match peer.fetch(&self.name, key).await {
                        Ok(value) => {
                            self.loads.record_peer_load();
                            return Ok(value);
                        }
                        Err(err) => {
                            self.loads.record_peer_failure();
                            warn!("[{}] Failed to get '{}' from peer: {}", self.name, key, err);
                        }
                    }
                }
                self.get_locally(key).await
            })
            .await
    }

    async fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        self.peers.get()?.pick_peer(key).await
    }

    // == Get Locally ==
    /// Runs the data source for `key` and caches the result.
    pub async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let Some(getter) = self.getter.as_ref() else {
            return Err(CacheError::NotFound(format!(
                "no data for key '{}' in group '{}'",
                key, self.name
            )));
        };

        let getter = Arc::clone(getter);
        let owned_key = key.to_string();
        let bytes = tokio::task::spawn_blocking(move || getter.get(&owned_key))
            .await
            .map_err(|e| CacheError::Internal(format!("data source task failed: {}", e)))?
            .map_err(CacheError::load)?;

        let value = ByteView::from(bytes);
        self.loads.record_local_load();
        self.store.add(key.to_string(), value.clone()).await;
        Ok(value)
    }

    // == Set ==
    /// Writes `value` into the local store; peers are not consulted.
    pub async fn set(&self, key: impl Into<String>, value: impl Into<ByteView>) {
        self.store.add(key.into(), value.into()).await;
    }

    /// Writes a batch under one store lock. The last entry ends up
    /// most-recently-used.
    pub async fn set_many<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, ByteView)>,
    {
        self.store.add_many(entries).await;
    }

    // == Delete ==
    /// Removes `key` from the local store only.
    pub async fn delete(&self, key: &str) -> bool {
        self.store.delete(key).await
    }

    // == Introspection ==
    pub async fn keys(&self) -> BTreeSet<String> {
        self.store.keys().await
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }

    /// Whether `key` is cached locally, without touching recency or stats.
    pub async fn contains(&self, key: &str) -> bool {
        self.store.contains(key).await
    }

    pub async fn stats(&self) -> GroupStats {
        GroupStats::new(&self.name, self.store.stats().await, &self.loads)
    }

    /// Copies the group's contents for persistence.
    /// Byte budget of the backing store, 0 = unbounded.
    pub async fn max_bytes(&self) -> usize {
        self.store.max_bytes().await
    }

    pub async fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot {
            name: self.name.clone(),
            max_bytes: self.store.max_bytes().await,
            entries: self.store.entries().await,
        }
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("has_getter", &self.getter.is_some())
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn scores() -> HashMap<&'static str, &'static str> {
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")])
    }

    /// Data source over `scores()` that counts how often each key is loaded.
    fn counting_getter(counts: Arc<std::sync::Mutex<HashMap<String, usize>>>) -> Arc<dyn Getter> {
        Arc::new(move |key: &str| -> anyhow::Result<Vec<u8>> {
            *counts.lock().unwrap().entry(key.to_string()).or_default() += 1;
            scores()
                .get(key)
                .map(|v| v.as_bytes().to_vec())
                .ok_or_else(|| anyhow::anyhow!("{} not exist", key))
        })
    }

    struct StaticPeer {
        value: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PeerFetcher for StaticPeer {
        async fn fetch(&self, _group: &str, key: &str) -> Result<ByteView> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.value {
                Some(v) => Ok(ByteView::from(v)),
                None => Err(CacheError::PeerUnavailable(format!("down while fetching {}", key))),
            }
        }
    }

    /// Routes every key to one peer, or to nobody.
    struct FixedPicker(Option<Arc<StaticPeer>>);

    #[async_trait]
    impl PeerPicker for FixedPicker {
        async fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerFetcher>> {
            self.0.clone().map(|p| p as Arc<dyn PeerFetcher>)
        }
    }

    fn remote(value: Option<&'static str>) -> Arc<StaticPeer> {
        Arc::new(StaticPeer {
            value,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_get_loads_once_then_hits() {
        let counts = Arc::default();
        let group = Group::new("scores", 2 << 10, Some(counting_getter(Arc::clone(&counts))));

        for (k, v) in scores() {
            assert_eq!(group.get(k).await.unwrap().as_slice(), v.as_bytes());
            assert_eq!(group.get(k).await.unwrap().as_slice(), v.as_bytes());
            assert_eq!(counts.lock().unwrap()[k], 1, "cache {} miss", k);
        }

        let stats = group.stats().await;
        assert_eq!(stats.local_loads, 3);
        assert_eq!(stats.cache.hits, 3);
    }

    #[tokio::test]
    async fn test_get_empty_key_is_invalid() {
        let group = Group::new("scores", 0, None);
        assert!(matches!(
            group.get("").await,
            Err(CacheError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_get_without_getter_is_not_found() {
        let group = Group::new("scores", 0, None);
        assert!(matches!(
            group.get("Tom").await,
            Err(CacheError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_getter_error_is_surfaced_verbatim() {
        let group = Group::new("scores", 0, Some(counting_getter(Arc::default())));
        let err = assert_err!(group.get("unknown").await);
        assert_eq!(err.to_string(), "unknown not exist");
        assert!(!group.contains("unknown").await);
    }

    #[tokio::test]
    async fn test_set_then_get_roundtrip() {
        let group = Group::new("scores", 0, None);
        group.register_peers(Arc::new(FixedPicker(Some(remote(Some("remote"))))));

        group.set("k", vec![0u8, 159, 146, 150]).await;
        let value = assert_ok!(group.get("k").await);
        assert_eq!(value.as_slice(), &[0u8, 159, 146, 150]);
    }

    #[tokio::test]
    async fn test_delete_is_local() {
        let group = Group::new("scores", 0, None);
        group.set("k", "v").await;

        assert!(group.delete("k").await);
        assert!(!group.delete("k").await);
        assert!(group.is_empty().await);
    }

    #[tokio::test]
    async fn test_remote_hit_is_not_cached() {
        let counts = Arc::default();
        let peer = remote(Some("from-peer"));
        let group = Group::new("scores", 0, Some(counting_getter(Arc::clone(&counts))));
        group.register_peers(Arc::new(FixedPicker(Some(Arc::clone(&peer)))));

        let value = group.get("Tom").await.unwrap();
        assert_eq!(value.as_slice(), b"from-peer");
        assert!(!group.contains("Tom").await);

        group.get("Tom").await.unwrap();
        assert_eq!(peer.calls.load(Ordering::SeqCst), 2);
        assert!(counts.lock().unwrap().is_empty());
        assert_eq!(group.stats().await.peer_loads, 2);
    }

    #[tokio::test]
    async fn test_unreachable_peer_falls_back_and_caches() {
        let counts = Arc::default();
        let peer = remote(None);
        let group = Group::new("scores", 0, Some(counting_getter(Arc::clone(&counts))));
        group.register_peers(Arc::new(FixedPicker(Some(Arc::clone(&peer)))));

        let value = group.get("Jack").await.unwrap();
        assert_eq!(value.as_slice(), b"589");
        assert!(group.contains("Jack").await);

        group.get("Jack").await.unwrap();
        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(counts.lock().unwrap()["Jack"], 1);

        let stats = group.stats().await;
        assert_eq!(stats.peer_failures, 1);
        assert_eq!(stats.local_loads, 1);
    }

    #[tokio::test]
    async fn test_locally_owned_key_skips_peers() {
        let group = Group::new("scores", 0, Some(counting_getter(Arc::default())));
        group.register_peers(Arc::new(FixedPicker(None)));

        assert_eq!(group.get("Sam").await.unwrap().as_slice(), b"567");
        assert!(group.contains("Sam").await);
    }

    #[tokio::test]
    async fn test_unreachable_peer_without_getter_is_not_found() {
        let group = Group::new("scores", 0, None);
        group.register_peers(Arc::new(FixedPicker(Some(remote(None)))));

        assert!(matches!(
            group.get("Tom").await,
            Err(CacheError::NotFound(_))
        ));
    }

    #[test]
    #[should_panic(expected = "register_peers called more than once")]
    fn test_double_peer_registration_panics() {
        let group = Group::new("scores", 0, None);
        group.register_peers(Arc::new(FixedPicker(None)));
        group.register_peers(Arc::new(FixedPicker(None)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_load_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let getter: Arc<dyn Getter> = Arc::new(move |key: &str| -> anyhow::Result<Vec<u8>> {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(200));
            Ok(format!("value-of-{}", key).into_bytes())
        });
        let group = Arc::new(Group::new("scores", 0, Some(getter)));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let group = Arc::clone(&group);
            handles.push(tokio::spawn(async move { group.get("hot").await }));
        }

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| v.as_slice() == b"value-of-hot"));
    }

    #[tokio::test]
    async fn test_snapshot_is_most_recent_first() {
        let group = Group::new("scores", 512, None);
        group.set("a", "1").await;
        group.set("b", "2").await;
        group.get("a").await.unwrap();

        let snapshot = group.snapshot().await;
        assert_eq!(snapshot.name, "scores");
        assert_eq!(snapshot.max_bytes, 512);
        let keys: Vec<&str> = snapshot.entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
