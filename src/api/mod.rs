//! API Module
//!
//! HTTP diagnostics and change-notification surface over the cache registry.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Per-cache statistics
//! - `POST /changes` - Data-change notification
//! - `POST /webhooks/rows` - Database row-change webhook
//! - `DELETE /caches/:name` - Clear a named cache

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
