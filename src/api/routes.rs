//! API Routes
//!
//! Configures the Axum router with all cache node endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_group_handler, delete_group_handler, delete_value_handler, get_value_handler,
    group_stats_handler, health_handler, list_groups_handler, list_keys_handler,
    put_value_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET|POST /groups` - List or create groups
/// - `DELETE /groups/:group` - Remove a group
/// - `GET /groups/:group/keys` - Keys cached in a group
/// - `GET /groups/:group/stats` - Group statistics
/// - `GET|PUT|DELETE /cache/:group/:key` - Read-through get, set, delete
///
/// `GET /cache/:group/:key` is also the endpoint peers fetch from.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/groups", get(list_groups_handler).post(create_group_handler))
        .route("/groups/:group", delete(delete_group_handler))
        .route("/groups/:group/keys", get(list_keys_handler))
        .route("/groups/:group/stats", get(group_stats_handler))
        .route(
            "/cache/:group/:key",
            get(get_value_handler)
                .put(put_value_handler)
                .delete(delete_value_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
