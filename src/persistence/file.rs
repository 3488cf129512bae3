//! Snapshot file reader and writer.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::ByteView;
use crate::group::{GroupSnapshot, Registry};

#[derive(Debug, Serialize, Deserialize)]
struct GroupHeader {
    name: String,
    max_bytes: usize,
    count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    key: String,
    value: Vec<u8>,
}

fn encode(snapshots: &[GroupSnapshot]) -> anyhow::Result<String> {
    let mut out = String::new();
    for snapshot in snapshots {
        let header = GroupHeader {
            name: snapshot.name.clone(),
            max_bytes: snapshot.max_bytes,
            count: snapshot.len(),
        };
        out.push_str(&serde_json::to_string(&header)?);
        out.push('\n');
        for (key, value) in &snapshot.entries {
            let record = EntryRecord {
                key: key.clone(),
                value: value.to_vec(),
            };
            out.push_str(&serde_json::to_string(&record)?);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Parses snapshot text. A group whose entries are missing is dropped with a
/// warning. A line that does not parse means the file was cut off or damaged:
/// reading stops there, keeping every complete group decoded before it.
fn decode(text: &str) -> Vec<GroupSnapshot> {
    let mut snapshots = Vec::new();
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    while let Some((line_no, line)) = lines.next() {
        let header: GroupHeader = match serde_json::from_str(line) {
            Ok(header) => header,
            Err(e) => {
                warn!("Stopping at line {}: expected group header: {}", line_no + 1, e);
                return snapshots;
            }
        };

        let mut snapshot = GroupSnapshot::new(header.name, header.max_bytes);
        for _ in 0..header.count {
            let Some((line_no, line)) = lines.next() else {
                break;
            };
            match serde_json::from_str::<EntryRecord>(line) {
                Ok(record) => snapshot.entries.push((record.key, ByteView::from(record.value))),
                Err(e) => {
                    warn!(
                        "Skipping group '{}' and the rest of the file: line {}: {}",
                        snapshot.name,
                        line_no + 1,
                        e
                    );
                    return snapshots;
                }
            }
        }

        if snapshot.len() != header.count {
            warn!(
                "Skipping group '{}': expected {} entries, found {}",
                snapshot.name,
                header.count,
                snapshot.len()
            );
            continue;
        }
        snapshots.push(snapshot);
    }
    snapshots
}

// == Save ==
/// Writes every group in `registry` to `path`, replacing it atomically.
///
/// Returns the number of groups written.
pub async fn save(registry: &Registry, path: &Path) -> anyhow::Result<usize> {
    let snapshots = registry.snapshots().await;
    let text = encode(&snapshots)?;

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, text)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))?;

    info!("Saved {} groups to {}", snapshots.len(), path.display());
    Ok(snapshots.len())
}

// == Load ==
/// Replays the file at `path` into `registry`. A missing file is not an
/// error. Returns the number of groups restored.
pub async fn load(registry: &Registry, path: &Path) -> anyhow::Result<usize> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No persistence file at {}, starting empty", path.display());
            return Ok(0);
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    let snapshots = decode(&text);
    let mut count = 0;
    for snapshot in snapshots {
        let entries = snapshot.len();
        let name = snapshot.name.clone();
        match registry.restore(snapshot).await {
            Ok(group) => {
                count += 1;
                info!("Restored {} entries into group '{}'", entries, group.name());
            }
            Err(e) => warn!("Skipping group '{}': {}", name, e),
        }
    }
    Ok(count)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
