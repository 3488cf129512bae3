//! Point-in-time copy of a group's contents.

use crate::cache::ByteView;

// == Group Snapshot ==
/// Everything needed to rebuild a group elsewhere: its name, its byte budget
/// and its entries ordered most-recently-used first.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSnapshot {
    pub name: String,
    pub max_bytes: usize,
    pub entries: Vec<(String, ByteView)>,
}

impl GroupSnapshot {
    pub fn new(name: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            name: name.into(),
            max_bytes,
            entries: Vec::new(),
        }
    }

    /// Number of entries captured.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered least-recently-used first, the order in which
    /// re-inserting them restores the original recency.
    pub fn replay_order(&self) -> impl Iterator<Item = (String, ByteView)> + '_ {
        self.entries.iter().rev().cloned()
    }
}
