//! Error types for the cache node
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache node.
///
/// Cloneable so that a coalesced load can hand the same error to every
/// caller that waited on it.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Empty key, empty group name or otherwise malformed input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown group, or no data for the key anywhere
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote fetch failed; recovered locally by the group
    #[error("Peer unavailable: {0}")]
    PeerUnavailable(String),

    /// A group with this name is already registered
    #[error("Group already exists: {0}")]
    AlreadyExists(String),

    /// Error returned by the data-loading callback, surfaced verbatim
    #[error("{0}")]
    Load(Arc<anyhow::Error>),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wraps an error coming out of a [`Getter`](crate::group::Getter).
    pub fn load(err: anyhow::Error) -> Self {
        CacheError::Load(Arc::new(err))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CacheError::AlreadyExists(_) => StatusCode::CONFLICT,
            CacheError::PeerUnavailable(_) | CacheError::Load(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache node.
pub type Result<T> = std::result::Result<T, CacheError>;
