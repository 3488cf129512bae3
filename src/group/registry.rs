//! Group Registry
//!
//! Process-wide table of groups, created at startup and passed explicitly to
//! the layers that need it.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{CacheError, Result};
use crate::group::{Getter, Group, GroupSnapshot};
use crate::peers::PeerPicker;

// == Registry ==
/// Named groups behind a reader-writer lock.
///
/// Lookups run concurrently; creation and removal are exclusive. The lock is
/// never held while a group does I/O: callers get an `Arc<Group>` and work on
/// it after the lock is released.
#[derive(Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
    peers: Option<Arc<dyn PeerPicker>>,
}

impl Registry {
    // == Constructor ==
    /// Creates a registry whose groups serve every key locally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry whose groups route misses through `peers`.
    pub fn with_peers(peers: Arc<dyn PeerPicker>) -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
            peers: Some(peers),
        }
    }

    // == Create ==
    /// Registers a new group.
    ///
    /// # Errors
    /// - `InvalidArgument` if `name` is empty
    /// - `AlreadyExists` if a group with `name` is registered
    pub async fn create(
        &self,
        name: &str,
        max_bytes: usize,
        getter: Option<Arc<dyn Getter>>,
    ) -> Result<Arc<Group>> {
        if name.is_empty() {
            return Err(CacheError::InvalidArgument("group name is required".to_string()));
        }

        let mut groups = self.groups.write().await;
        if groups.contains_key(name) {
            return Err(CacheError::AlreadyExists(name.to_string()));
        }

        let group = Arc::new(Group::new(name, max_bytes, getter));
        if let Some(peers) = &self.peers {
            group.register_peers(Arc::clone(peers));
        }
        groups.insert(name.to_string(), Arc::clone(&group));
        info!("Created group '{}' with {} bytes", name, max_bytes);
        Ok(group)
    }

    /// Returns the group named `name`, creating it when absent. An existing
    /// group keeps its own budget and data source.
    pub async fn get_or_create(
        &self,
        name: &str,
        max_bytes: usize,
        getter: Option<Arc<dyn Getter>>,
    ) -> Result<Arc<Group>> {
        match self.create(name, max_bytes, getter).await {
            Err(CacheError::AlreadyExists(_)) => self.group(name).await,
            other => other,
        }
    }

    // == Lookup ==
    pub async fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().await.get(name).cloned()
    }

    /// Like [`get`](Self::get), but an unknown name is a `NotFound` error.
    pub async fn group(&self, name: &str) -> Result<Arc<Group>> {
        self.get(name)
            .await
            .ok_or_else(|| CacheError::NotFound(format!("no such group: {}", name)))
    }

    // == Remove ==
    /// Drops a group and its contents; returns whether it existed.
    pub async fn remove(&self, name: &str) -> bool {
        let removed = self.groups.write().await.remove(name).is_some();
        if removed {
            info!("Removed group '{}'", name);
        }
        removed
    }

    // == Introspection ==
    pub async fn group_names(&self) -> BTreeSet<String> {
        self.groups.read().await.keys().cloned().collect()
    }

    /// Keys cached in group `name`.
    pub async fn list_keys(&self, name: &str) -> Result<BTreeSet<String>> {
        Ok(self.group(name).await?.keys().await)
    }

    pub async fn len(&self) -> usize {
        self.groups.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.groups.read().await.is_empty()
    }

    // == Snapshots ==
    /// One snapshot per group, ordered by group name.
    pub async fn snapshots(&self) -> Vec<GroupSnapshot> {
        let mut groups: Vec<Arc<Group>> = self.groups.read().await.values().cloned().collect();
        groups.sort_by(|a, b| a.name().cmp(b.name()));

        let mut snapshots = Vec::with_capacity(groups.len());
        for group in groups {
            snapshots.push(group.snapshot().await);
        }
        snapshots
    }

    /// Seeds a group from a snapshot, creating it with the snapshot's budget
    /// if it does not exist yet. Entries are written in one batch.
    pub async fn restore(&self, snapshot: GroupSnapshot) -> Result<Arc<Group>> {
        let group = self.get_or_create(&snapshot.name, snapshot.max_bytes, None).await?;
        let budget = group.max_bytes().await;
        if budget != snapshot.max_bytes {
            warn!(
                "Group '{}' keeps its budget of {} bytes; snapshot recorded {}",
                snapshot.name, budget, snapshot.max_bytes
            );
        }
        group.set_many(snapshot.replay_order()).await;
        Ok(group)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("has_peers", &self.peers.is_some())
            .finish()
    }
}
