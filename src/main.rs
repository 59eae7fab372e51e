//! Query Cache - standalone cache process
//!
//! Runs the named caches with their maintenance task and exposes the
//! diagnostics and change-notification endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use query_cache::api::{create_router, AppState};
use query_cache::{CacheRegistry, Config, MaintenanceScheduler};

/// Main entry point for the cache process.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Build the cache registry
/// 4. Start the maintenance scheduler
/// 5. Serve the HTTP surface on the configured port
/// 6. On SIGINT/SIGTERM stop serving, then stop the scheduler
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "query_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting query cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, prune_interval={}s, diagnostics={}",
        config.server_port, config.prune_interval, config.diagnostics
    );

    let registry = Arc::new(
        CacheRegistry::from_config(&config).context("invalid cache configuration")?,
    );

    let mut scheduler = MaintenanceScheduler::new(
        Arc::clone(&registry),
        config.prune_interval(),
        config.diagnostics,
    );
    scheduler.start();

    let app = create_router(AppState::new(registry));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    scheduler.stop().await;
    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
