//! API Handlers
//!
//! HTTP request handlers for each cache node endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::cache::GroupStats;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::group::Registry;
use crate::models::{
    CreateGroupRequest, CreateGroupResponse, DeleteResponse, GroupListResponse, HealthResponse,
    KeyListResponse, SetResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Every group served by this node
    pub registry: Arc<Registry>,
    /// Budget for groups created without an explicit `max_bytes`
    pub default_group_bytes: usize,
}

impl AppState {
    /// Creates a new AppState around an existing registry.
    pub fn new(registry: Arc<Registry>, default_group_bytes: usize) -> Self {
        Self {
            registry,
            default_group_bytes,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(registry: Arc<Registry>, config: &Config) -> Self {
        Self::new(registry, config.default_group_bytes)
    }
}

// == Groups ==

/// Handler for GET /groups
pub async fn list_groups_handler(State(state): State<AppState>) -> Json<GroupListResponse> {
    Json(GroupListResponse {
        groups: state.registry.group_names().await,
    })
}

/// Handler for POST /groups
///
/// Creates a group with no data source: its values arrive through
/// `PUT /cache/:group/:key` or from the owning peer.
pub async fn create_group_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<CreateGroupResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidArgument(error_msg));
    }

    let name = req.name();
    let max_bytes = req.max_bytes.unwrap_or(state.default_group_bytes);
    state.registry.create(name, max_bytes, None).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateGroupResponse::new(name, max_bytes)),
    ))
}

/// Handler for DELETE /groups/:group
pub async fn delete_group_handler(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.registry.remove(&group).await {
        return Err(CacheError::NotFound(format!("no such group: {}", group)));
    }
    Ok(Json(DeleteResponse::new(group)))
}

/// Handler for GET /groups/:group/keys
pub async fn list_keys_handler(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<KeyListResponse>> {
    let keys = state.registry.list_keys(&group).await?;
    Ok(Json(KeyListResponse { group, keys }))
}

/// Handler for GET /groups/:group/stats
pub async fn group_stats_handler(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<GroupStats>> {
    let group = state.registry.group(&group).await?;
    Ok(Json(group.stats().await))
}

// == Values ==

/// Handler for GET /cache/:group/:key
///
/// Serves both clients and peers: the body is the raw value.
pub async fn get_value_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let group = state.registry.group(&group).await?;
    let value = group.get(&key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        value.to_vec(),
    ))
}

/// Handler for PUT /cache/:group/:key
pub async fn put_value_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<SetResponse>> {
    if key.is_empty() {
        return Err(CacheError::InvalidArgument("key is required".to_string()));
    }
    let handle = state.registry.group(&group).await?;
    handle.set(key.clone(), &body[..]).await;

    Ok(Json(SetResponse::new(group, key)))
}

/// Handler for DELETE /cache/:group/:key
pub async fn delete_value_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let handle = state.registry.group(&group).await?;
    if !handle.delete(&key).await {
        return Err(CacheError::NotFound(format!(
            "key '{}' not cached in group '{}'",
            key, group
        )));
    }
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
