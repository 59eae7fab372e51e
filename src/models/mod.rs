//! Request and Response models for the diagnostics and webhook API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::RowChangeWebhook;
pub use responses::{
    CacheStatsResponse, ChangeResponse, ClearResponse, HealthResponse, StatsResponse,
};
