//! Request and Response models for the cache node API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::CreateGroupRequest;
pub use responses::{
    CreateGroupResponse, DeleteResponse, GroupListResponse, HealthResponse, KeyListResponse,
    SetResponse,
};
