//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ring::DEFAULT_REPLICAS;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// This node's identity on the hash ring
    pub self_addr: String,
    /// Base URLs of every node in the cluster
    pub peers: Vec<String>,
    /// Group created at startup
    pub default_group: String,
    /// Byte budget of groups created without an explicit one
    pub default_group_bytes: usize,
    /// Virtual replicas per peer on the hash ring
    pub ring_replicas: usize,
    /// Upper bound on one remote fetch, in milliseconds
    pub peer_timeout_ms: u64,
    /// Whether to load and save the persistence file
    pub persistence_enabled: bool,
    /// Persistence file location
    pub persistence_path: PathBuf,
    /// Seconds between periodic snapshots
    pub persistence_interval: u64,
}

fn parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated peer list, dropping blanks and trailing slashes.
fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().trim_end_matches('/'))
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SELF_ADDR` - Ring identity (default: `http://127.0.0.1:{SERVER_PORT}`)
    /// - `PEERS` - Comma-separated peer base URLs (default: none)
    /// - `DEFAULT_GROUP` - Group created at startup (default: "default")
    /// - `DEFAULT_GROUP_BYTES` - Default byte budget (default: 2048)
    /// - `RING_REPLICAS` - Virtual replicas per peer (default: 50)
    /// - `PEER_TIMEOUT_MS` - Remote fetch timeout (default: 2000)
    /// - `PERSISTENCE_ENABLED` - Load/save snapshots (default: false)
    /// - `PERSISTENCE_PATH` - Snapshot file (default: "persistence.jsonl")
    /// - `PERSISTENCE_INTERVAL` - Seconds between snapshots (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let server_port = parsed("SERVER_PORT", defaults.server_port);
        let self_addr = env::var("SELF_ADDR")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", server_port));

        Self {
            server_port,
            self_addr,
            peers: env::var("PEERS")
                .map(|v| parse_peers(&v))
                .unwrap_or_default(),
            default_group: env::var("DEFAULT_GROUP")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.default_group),
            default_group_bytes: parsed("DEFAULT_GROUP_BYTES", defaults.default_group_bytes),
            ring_replicas: parsed("RING_REPLICAS", defaults.ring_replicas),
            peer_timeout_ms: parsed("PEER_TIMEOUT_MS", defaults.peer_timeout_ms),
            persistence_enabled: parsed("PERSISTENCE_ENABLED", defaults.persistence_enabled),
            persistence_path: env::var("PERSISTENCE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.persistence_path),
            persistence_interval: parsed("PERSISTENCE_INTERVAL", defaults.persistence_interval),
        }
    }

    /// The full ring membership: configured peers plus this node.
    pub fn cluster(&self) -> Vec<String> {
        let mut cluster = self.peers.clone();
        if !cluster.contains(&self.self_addr) {
            cluster.push(self.self_addr.clone());
        }
        cluster
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            self_addr: "http://127.0.0.1:3000".to_string(),
            peers: Vec::new(),
            default_group: "default".to_string(),
            default_group_bytes: 2048,
            ring_replicas: DEFAULT_REPLICAS,
            peer_timeout_ms: 2000,
            persistence_enabled: false,
            persistence_path: PathBuf::from("persistence.jsonl"),
            persistence_interval: 60,
        }
    }
}
