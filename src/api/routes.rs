//! API Routes
//!
//! Configures the Axum router with the diagnostics and change endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    change_handler, clear_handler, health_handler, row_webhook_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Statistics for every named cache
/// - `POST /changes` - Dispatch invalidation for a data change
/// - `POST /webhooks/rows` - Dispatch invalidation for a database row-change webhook
/// - `DELETE /caches/:name` - Clear one named cache
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/changes", post(change_handler))
        .route("/webhooks/rows", post(row_webhook_handler))
        .route("/caches/:name", delete(clear_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::registry::CacheRegistry;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn app() -> Router {
        let registry = CacheRegistry::from_config(&Config::default()).unwrap();
        create_router(AppState::new(Arc::new(registry)))
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app().oneshot(request(Method::GET, "/keys")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let response = app().oneshot(request(Method::GET, "/changes")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = app()
            .oneshot(request(Method::POST, "/caches/query"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_clear_each_named_cache() {
        for name in ["query", "user", "reference"] {
            let response = app()
                .oneshot(request(Method::DELETE, &format!("/caches/{name}")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "cache {name}");
        }
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .header(header::ORIGIN, "http://dashboard.local")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
