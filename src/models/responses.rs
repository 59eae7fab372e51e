//! Response DTOs for the diagnostics and webhook API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheProfile, CacheStats};
use crate::registry::CacheKind;

/// Statistics for one named cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub cache: CacheKind,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    /// Percentage of lookups answered from the cache
    pub hit_rate: f64,
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl CacheStatsResponse {
    pub fn new(cache: CacheKind, stats: &CacheStats, profile: CacheProfile) -> Self {
        Self {
            cache,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            size: stats.size,
            hit_rate: stats.hit_rate(),
            ttl_secs: profile.default_ttl.as_secs(),
            max_entries: profile.max_entries,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub caches: Vec<CacheStatsResponse>,
}

/// Response body for the change endpoints (POST /changes, POST /webhooks/rows)
#[derive(Debug, Clone, Serialize)]
pub struct ChangeResponse {
    pub message: String,
    pub resource: String,
}

impl ChangeResponse {
    pub fn accepted(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self {
            message: format!("Invalidation for '{}' dispatched", resource),
            resource,
        }
    }
}

/// Response body for DELETE /caches/:name
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub cache: CacheKind,
}

impl ClearResponse {
    pub fn new(cache: CacheKind) -> Self {
        Self {
            message: format!("Cache '{}' cleared", cache),
            cache,
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
