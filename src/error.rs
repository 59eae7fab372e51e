//! Error types for the query cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction, key building and the diagnostics API.
///
/// Errors raised by a caller's compute function never pass through this type;
/// they are handed back to the caller unchanged.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache or registry configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A key pattern could not be compiled
    #[error("Invalid key pattern: {0}")]
    InvalidPattern(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No named cache with this name exists in the registry
    #[error("Unknown cache: {0}")]
    UnknownCache(String),

    /// A value or filter object could not be (de)serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::InvalidPattern(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::UnknownCache(_) => StatusCode::NOT_FOUND,
            CacheError::Serialization(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the query cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_cache_maps_to_not_found() {
        let response = CacheError::UnknownCache("sessions".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_pattern_maps_to_bad_request() {
        let response = CacheError::InvalidPattern("(".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_display() {
        let err = CacheError::InvalidConfig("max_entries must be greater than zero".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: max_entries must be greater than zero"
        );
    }
}
