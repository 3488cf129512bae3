//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Snapshot: writes every group to the persistence file at a fixed interval

mod snapshot;

pub use snapshot::spawn_snapshot_task;
