//! Request DTOs for the cache node API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for group creation (POST /groups)
///
/// # Fields
/// - `name`: The group name
/// - `max_bytes`: Optional byte budget (uses the configured default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    /// The group name
    pub name: String,
    /// Optional byte budget, 0 = unbounded
    #[serde(default)]
    pub max_bytes: Option<usize>,
}

impl CreateGroupRequest {
    /// The group name with surrounding whitespace removed; this is the name
    /// that gets registered.
    pub fn name(&self) -> &str {
        self.name.trim()
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name().is_empty() {
            return Some("Group name cannot be empty".to_string());
        }
        if self.name().contains('/') {
            return Some("Group name cannot contain '/'".to_string());
        }
        None
    }
}
