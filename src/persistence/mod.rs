//! Persistence Module
//!
//! Saves every group to a JSON-lines file and replays it on startup.
//!
//! # Format
//! ```text
//! {"name":"scores","max_bytes":2048,"count":2}
//! {"key":"Tom","value":[54,51,48]}
//! {"key":"Jack","value":[53,56,57]}
//! {"name":"sessions", ...}
//! ```
//! Entries follow their header most-recently-used first.

mod file;

pub use file::{load, save};
