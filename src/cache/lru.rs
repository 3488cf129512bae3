//! LRU Cache Module
//!
//! Byte-budgeted least-recently-used cache backed by an index arena.
//!
//! ```text
//!   nodes: Vec<Option<Node>>          index: HashMap<String, usize>
//!   ┌─────┬──────────────────────────────┐
//!   │ 0   │ { "b", prev: Some(2), next: None } ◄── tail (LRU)
//!   │ 1   │ None (free)                  │
//!   │ 2   │ { "a", prev: None, next: Some(0) } ◄── head (MRU)
//!   └─────┴──────────────────────────────┘
//! ```
//!
//! Promotion, insertion and eviction are O(1): nodes are relinked by index,
//! freed slots are reused through a free list.

use std::collections::{BTreeSet, HashMap};

use crate::cache::ByteView;

/// Invoked with every entry removed to satisfy the byte budget.
pub type EvictionCallback = Box<dyn FnMut(&str, &ByteView) + Send>;

#[derive(Debug)]
struct Node {
    key: String,
    value: ByteView,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Node {
    fn cost(&self) -> usize {
        entry_cost(&self.key, &self.value)
    }
}

/// Accounting cost of an entry: key bytes plus value bytes.
pub fn entry_cost(key: &str, value: &ByteView) -> usize {
    key.len() + value.len()
}

// == LRU Cache ==
/// Least-recently-used cache bounded by the total byte cost of its entries.
///
/// `max_bytes == 0` means unbounded. Not thread-safe; see
/// [`Store`](crate::cache::Store) for the locked wrapper.
pub struct LruCache {
    max_bytes: usize,
    used_bytes: usize,
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<EvictionCallback>,
}

impl LruCache {
    // == Constructor ==
    /// Creates an empty cache with the given byte budget (0 = unbounded).
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            nodes: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            on_evicted: None,
        }
    }

    /// Creates an empty cache that reports evictions to `on_evicted`.
    pub fn with_eviction_callback(max_bytes: usize, on_evicted: EvictionCallback) -> Self {
        let mut cache = Self::new(max_bytes);
        cache.on_evicted = Some(on_evicted);
        cache
    }

    // == Get ==
    /// Looks up `key`, promoting it to most-recently-used on a hit.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.node(idx).map(|node| node.value.clone())
    }

    // == Put ==
    /// Inserts or replaces `key`, then evicts from the LRU end until the
    /// budget holds again.
    ///
    /// Returns the number of entries evicted.
    pub fn put(&mut self, key: String, value: ByteView) -> usize {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(node) = self.nodes[idx].as_mut() {
                self.used_bytes = self.used_bytes - node.value.len() + value.len();
                node.value = value;
            }
            self.move_to_front(idx);
        } else {
            self.used_bytes += entry_cost(&key, &value);
            let node = Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            };
            let idx = match self.free.pop() {
                Some(idx) => {
                    self.nodes[idx] = Some(node);
                    idx
                }
                None => {
                    self.nodes.push(Some(node));
                    self.nodes.len() - 1
                }
            };
            self.index.insert(key, idx);
            self.attach_front(idx);
        }

        let mut evicted = 0;
        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if !self.remove_oldest() {
                break;
            }
            evicted += 1;
        }
        evicted
    }

    // == Delete ==
    /// Removes `key` if present. Not an eviction: the callback is not run.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.index.get(key).copied() {
            Some(idx) => {
                self.take(idx);
                true
            }
            None => false,
        }
    }

    // == Remove Oldest ==
    /// Evicts the least-recently-used entry and reports it to the callback.
    ///
    /// Returns false when the cache is empty.
    pub fn remove_oldest(&mut self) -> bool {
        let Some(idx) = self.tail else {
            return false;
        };
        let Some(node) = self.take(idx) else {
            return false;
        };
        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&node.key, &node.value);
        }
        true
    }

    // == Snapshots ==
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All keys currently held.
    pub fn keys(&self) -> BTreeSet<String> {
        self.index.keys().cloned().collect()
    }

    /// All entries, most-recently-used first.
    pub fn entries(&self) -> Vec<(String, ByteView)> {
        let mut out = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let Some(node) = self.node(idx) else {
                break;
            };
            out.push((node.key.clone(), node.value.clone()));
            cursor = node.next;
        }
        out
    }

    /// Bytes currently accounted for.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Configured byte budget (0 = unbounded).
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    // == Internal Linking ==
    fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx).and_then(|slot| slot.as_ref())
    }

    /// Unlinks the node at `idx`, frees its slot and fixes the accounting.
    fn take(&mut self, idx: usize) -> Option<Node> {
        self.detach(idx);
        let node = self.nodes.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.index.remove(&node.key);
        self.used_bytes -= node.cost();
        Some(node)
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(head) = self.nodes[h].as_mut() {
                    head.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return,
        };
        match prev {
            Some(p) => {
                if let Some(node) = self.nodes[p].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.nodes[n].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    /// Walks the list and the index, checking links and byte accounting.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let entries = self.entries();
        assert_eq!(entries.len(), self.index.len(), "list and index disagree");
        let total: usize = entries.iter().map(|(k, v)| entry_cost(k, v)).sum();
        assert_eq!(total, self.used_bytes, "used_bytes drifted");
        if self.max_bytes != 0 {
            assert!(self.used_bytes <= self.max_bytes, "over budget");
        }
        let live = self.nodes.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(live + self.free.len(), self.nodes.len());
    }
}

impl std::fmt::Debug for LruCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.len())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn view(s: &str) -> ByteView {
        ByteView::from(s)
    }

    #[test]
    fn test_lru_new() {
        let lru = LruCache::new(0);
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_lru_get_hit_and_miss() {
        let mut lru = LruCache::new(0);
        lru.put("key1".to_string(), view("1234"));

        assert_eq!(lru.get("key1"), Some(view("1234")));
        assert_eq!(lru.get("key2"), None);
    }

    #[test]
    fn test_lru_accounting_on_update() {
        let mut lru = LruCache::new(0);
        lru.put("k".to_string(), view("aa"));
        assert_eq!(lru.used_bytes(), 3);

        lru.put("k".to_string(), view("aaaaa"));
        assert_eq!(lru.used_bytes(), 6);
        assert_eq!(lru.len(), 1);

        lru.put("k".to_string(), view("a"));
        assert_eq!(lru.used_bytes(), 2);
        lru.check_invariants();
    }

    #[test]
    fn test_lru_evicts_oldest_by_bytes() {
        let (k1, k2, k3) = ("key1", "key2", "k3");
        let (v1, v2, v3) = ("value1", "value2", "v3");
        let cap = k1.len() + k2.len() + v1.len() + v2.len();
        let mut lru = LruCache::new(cap);

        lru.put(k1.to_string(), view(v1));
        lru.put(k2.to_string(), view(v2));
        lru.put(k3.to_string(), view(v3));

        assert!(lru.get(k1).is_none());
        assert_eq!(lru.len(), 2);
        lru.check_invariants();
    }

    #[test]
    fn test_lru_read_promotes_entry() {
        // A, B, C fill the budget exactly; reading A makes B the victim.
        let cap = 3 * entry_cost("A", &view("xx"));
        let mut lru = LruCache::new(cap);
        lru.put("A".to_string(), view("xx"));
        lru.put("B".to_string(), view("xx"));
        lru.put("C".to_string(), view("xx"));

        lru.get("A");
        let evicted = lru.put("D".to_string(), view("xx"));

        assert_eq!(evicted, 1);
        assert!(lru.contains("A"));
        assert!(!lru.contains("B"));
        assert!(lru.contains("C"));
        assert!(lru.contains("D"));
    }

    #[test]
    fn test_lru_update_promotes_entry() {
        let cap = 3 * entry_cost("A", &view("xx"));
        let mut lru = LruCache::new(cap);
        lru.put("A".to_string(), view("xx"));
        lru.put("B".to_string(), view("xx"));
        lru.put("C".to_string(), view("xx"));

        lru.put("A".to_string(), view("yy"));
        lru.put("D".to_string(), view("xx"));

        assert_eq!(lru.get("A"), Some(view("yy")));
        assert!(!lru.contains("B"));
    }

    #[test]
    fn test_lru_eviction_callback() {
        let evicted: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&evicted);
        let mut lru = LruCache::with_eviction_callback(
            10,
            Box::new(move |key, _| sink.lock().unwrap().push(key.to_string())),
        );

        lru.put("key1".to_string(), view("123456"));
        lru.put("k2".to_string(), view("k2"));
        lru.put("k3".to_string(), view("k3"));
        lru.put("k4".to_string(), view("k4"));

        assert_eq!(*evicted.lock().unwrap(), vec!["key1", "k2"]);
    }

    #[test]
    fn test_lru_delete_does_not_run_callback() {
        let evicted: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&evicted);
        let mut lru = LruCache::with_eviction_callback(
            100,
            Box::new(move |key, _| sink.lock().unwrap().push(key.to_string())),
        );

        lru.put("a".to_string(), view("1"));
        assert!(lru.delete("a"));
        assert!(!lru.delete("a"));

        assert!(evicted.lock().unwrap().is_empty());
        assert_eq!(lru.used_bytes(), 0);
        lru.check_invariants();
    }

    #[test]
    fn test_lru_unbounded_never_evicts() {
        let mut lru = LruCache::new(0);
        for i in 0..1000 {
            lru.put(format!("key{}", i), view("some fairly long value"));
        }
        assert_eq!(lru.len(), 1000);
        lru.check_invariants();
    }

    #[test]
    fn test_lru_oversized_entry_is_dropped() {
        let mut lru = LruCache::new(4);
        lru.put("ab".to_string(), view("c"));
        let evicted = lru.put("big".to_string(), view("too large"));

        assert_eq!(evicted, 2);
        assert!(lru.is_empty());
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_lru_entries_most_recent_first() {
        let mut lru = LruCache::new(0);
        lru.put("a".to_string(), view("1"));
        lru.put("b".to_string(), view("2"));
        lru.put("c".to_string(), view("3"));
        lru.get("a");

        let keys: Vec<String> = lru.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_lru_slots_are_reused() {
        let mut lru = LruCache::new(0);
        lru.put("a".to_string(), view("1"));
        lru.put("b".to_string(), view("2"));
        lru.delete("a");
        lru.put("c".to_string(), view("3"));

        assert_eq!(lru.nodes.len(), 2);
        assert_eq!(lru.keys().into_iter().collect::<Vec<_>>(), vec!["b", "c"]);
        lru.check_invariants();
    }

    #[test]
    fn test_lru_remove_oldest_empty() {
        let mut lru = LruCache::new(10);
        assert!(!lru.remove_oldest());
    }
}
