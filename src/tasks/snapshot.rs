//! Periodic Snapshot Task
//!
//! Background task that periodically writes every group to the persistence
//! file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::group::Registry;
use crate::persistence;

/// Spawns a background task that saves `registry` to `path` every
/// `interval_secs` seconds.
///
/// A failed save is logged and retried on the next tick. The returned handle
/// is aborted on shutdown, after which the caller writes one final snapshot.
///
/// # Example
/// ```ignore
/// let registry = Arc::new(Registry::new());
/// let handle = spawn_snapshot_task(registry.clone(), "persistence.jsonl".into(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_snapshot_task(
    registry: Arc<Registry>,
    path: PathBuf,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting snapshot task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            if let Err(e) = persistence::save(&registry, &path).await {
                error!("Snapshot failed: {:#}", e);
            }
        }
    })
}
