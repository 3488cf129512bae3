//! Consistent Hashing Module
//!
//! Maps keys to owning peers so every node with the same membership agrees on
//! who owns what.

mod consistent;

pub use consistent::{crc32_hash, HashFn, HashRing, DEFAULT_REPLICAS};
