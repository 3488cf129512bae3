//! Hash ring with virtual replicas.

use std::collections::{BTreeSet, HashMap};

/// Virtual points per peer when the caller does not choose.
pub const DEFAULT_REPLICAS: usize = 50;

/// Hash used to place peers and keys on the ring.
pub type HashFn = fn(&[u8]) -> u32;

/// Default ring hash: CRC-32 (IEEE).
pub fn crc32_hash(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// == Hash Ring ==
/// Sorted ring of virtual points, each bound to one peer identity.
///
/// The ring is rebuilt wholesale on every membership change. Peers are placed
/// in sorted order, so two rings built from the same set agree even when two
/// virtual points collide.
#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    points: Vec<u32>,
    owners: HashMap<u32, String>,
    peers: BTreeSet<String>,
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS, None)
    }
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring.
    ///
    /// `replicas == 0` selects [`DEFAULT_REPLICAS`]; `hash == None` selects
    /// [`crc32_hash`].
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32_hash),
            replicas: if replicas == 0 { DEFAULT_REPLICAS } else { replicas },
            points: Vec::new(),
            owners: HashMap::new(),
            peers: BTreeSet::new(),
        }
    }

    /// Builds a ring already populated with `peers`.
    pub fn with_peers<I, S>(peers: I, replicas: usize, hash: Option<HashFn>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ring = Self::new(replicas, hash);
        ring.set_peers(peers);
        ring
    }

    // == Configure ==
    /// Replaces peers, replica count and hash in one step.
    pub fn configure<I, S>(&mut self, peers: I, replicas: usize, hash: Option<HashFn>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self = Self::with_peers(peers, replicas, hash);
    }

    /// Replaces the peer set, keeping replica count and hash.
    pub fn set_peers<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: BTreeSet<String> = peers.into_iter().map(Into::into).collect();
        let mut points = Vec::with_capacity(peers.len() * self.replicas);
        let mut owners = HashMap::with_capacity(peers.len() * self.replicas);

        for peer in &peers {
            for replica in 0..self.replicas {
                let point = (self.hash)(format!("{}{}", replica, peer).as_bytes());
                points.push(point);
                owners.insert(point, peer.clone());
            }
        }
        points.sort_unstable();

        self.points = points;
        self.owners = owners;
        self.peers = peers;
    }

    // == Route ==
    /// Returns the peer owning `key`: the first point at or after the key's
    /// hash, wrapping around to the first point.
    ///
    /// Returns `None` on an empty ring.
    pub fn route(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.points.partition_point(|&point| point < hash);
        let point = self.points[idx % self.points.len()];
        self.owners.get(&point).map(String::as_str)
    }

    // == Accessors ==
    pub fn peers(&self) -> &BTreeSet<String> {
        &self.peers
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Number of virtual points on the ring.
    pub fn points(&self) -> usize {
        self.points.len()
    }
}
