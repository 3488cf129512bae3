//! API Module
//!
//! HTTP handlers and routing for the cache node. The same router serves
//! clients and the peer protocol.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /groups`, `POST /groups` - List or create groups
//! - `DELETE /groups/:group` - Remove a group
//! - `GET /groups/:group/keys` - List cached keys
//! - `GET /groups/:group/stats` - Group statistics
//! - `GET /cache/:group/:key` - Read-through get (peer endpoint)
//! - `PUT /cache/:group/:key` - Store raw bytes
//! - `DELETE /cache/:group/:key` - Drop a cached key

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
