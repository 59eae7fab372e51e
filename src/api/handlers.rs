//! API Handlers
//!
//! HTTP request handlers for the diagnostics and change-notification endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::{CacheError, Result};
use crate::invalidation::{DataChange, InvalidationDispatcher};
use crate::models::{
    CacheStatsResponse, ChangeResponse, ClearResponse, HealthResponse, RowChangeWebhook,
    StatsResponse,
};
use crate::registry::{CacheKind, CacheRegistry};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Named caches
    pub registry: Arc<CacheRegistry>,
    /// Change-driven invalidation over the same registry
    pub dispatcher: InvalidationDispatcher,
}

impl AppState {
    /// Creates a new AppState around an existing registry.
    pub fn new(registry: Arc<CacheRegistry>) -> Self {
        Self {
            dispatcher: InvalidationDispatcher::new(Arc::clone(&registry)),
            registry,
        }
    }
}

/// Handler for GET /stats
///
/// Returns statistics for every named cache.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut caches = Vec::new();
    for (kind, cache) in state.registry.iter() {
        let stats = cache.stats().await;
        caches.push(CacheStatsResponse::new(kind, &stats, cache.profile()));
    }

    Json(StatsResponse { caches })
}

/// Handler for POST /changes
///
/// Dispatches invalidation for one data change.
pub async fn change_handler(
    State(state): State<AppState>,
    Json(change): Json<DataChange>,
) -> Result<(StatusCode, Json<ChangeResponse>)> {
    if change.resource.trim().is_empty() {
        return Err(CacheError::InvalidRequest(
            "Resource cannot be empty".to_string(),
        ));
    }

    state.dispatcher.dispatch(&change).await;

    Ok((StatusCode::ACCEPTED, Json(ChangeResponse::accepted(change.resource))))
}

/// Handler for POST /webhooks/rows
///
/// Accepts a database row-change webhook and dispatches invalidation for it.
pub async fn row_webhook_handler(
    State(state): State<AppState>,
    Json(webhook): Json<RowChangeWebhook>,
) -> Result<(StatusCode, Json<ChangeResponse>)> {
    if let Some(error_msg) = webhook.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let change = webhook.into_change();
    state.dispatcher.dispatch(&change).await;

    Ok((StatusCode::ACCEPTED, Json(ChangeResponse::accepted(change.resource))))
}

/// Handler for DELETE /caches/:name
///
/// Clears one named cache and resets its statistics.
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ClearResponse>> {
    let kind: CacheKind = name.parse()?;
    state.registry.get(kind).clear().await;

    Ok(Json(ClearResponse::new(kind)))
}

/// Handler for GET /health
///
/// Returns health status of the process.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
