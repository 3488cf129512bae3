//! Response DTOs for the cache node API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeSet;

use serde::Serialize;

/// Response body for the group listing (GET /groups)
#[derive(Debug, Clone, Serialize)]
pub struct GroupListResponse {
    /// Registered group names, sorted
    pub groups: BTreeSet<String>,
}

/// Response body for group creation (POST /groups)
#[derive(Debug, Clone, Serialize)]
pub struct CreateGroupResponse {
    /// Success message
    pub message: String,
    /// The created group
    pub group: String,
    /// Its byte budget
    pub max_bytes: usize,
}

impl CreateGroupResponse {
    pub fn new(group: impl Into<String>, max_bytes: usize) -> Self {
        let group = group.into();
        Self {
            message: format!("Group '{}' created successfully", group),
            group,
            max_bytes,
        }
    }
}

/// Response body for the key listing (GET /groups/:group/keys)
#[derive(Debug, Clone, Serialize)]
pub struct KeyListResponse {
    pub group: String,
    pub keys: BTreeSet<String>,
}

/// Response body for the SET operation (PUT /cache/:group/:key)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    pub group: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            group: group.into(),
            key,
        }
    }
}

/// Response body for the DELETE operations
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// What was deleted
    pub deleted: String,
}

impl DeleteResponse {
    pub fn new(deleted: impl Into<String>) -> Self {
        let deleted = deleted.into();
        Self {
            message: format!("'{}' deleted successfully", deleted),
            deleted,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
