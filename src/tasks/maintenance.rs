//! Maintenance Scheduler
//!
//! Background task that periodically prunes expired entries from every cache
//! in the registry and, with diagnostics on, logs their statistics.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::registry::CacheRegistry;

struct Running {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the periodic prune task.
///
/// Started once at process init and stopped during shutdown.
///
/// # Example
/// ```ignore
/// let mut scheduler = MaintenanceScheduler::new(registry.clone(), Duration::from_secs(60), false);
/// scheduler.start();
/// // Later, during shutdown:
/// scheduler.stop().await;
/// ```
pub struct MaintenanceScheduler {
    registry: Arc<CacheRegistry>,
    interval: Duration,
    diagnostics: bool,
    running: Option<Running>,
}

impl MaintenanceScheduler {
    pub fn new(registry: Arc<CacheRegistry>, interval: Duration, diagnostics: bool) -> Self {
        Self {
            registry,
            interval,
            diagnostics,
            running: None,
        }
    }

    // == Start ==
    /// Spawns the sweep loop. Calling it again while running does nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            warn!("Maintenance scheduler already running");
            return;
        }

        let (shutdown, mut shutdown_rx) = oneshot::channel();
        let registry = Arc::clone(&self.registry);
        let period = self.interval;
        let diagnostics = self.diagnostics;

        let handle = tokio::spawn(async move {
            info!(
                "Starting cache maintenance with interval of {:?}",
                period
            );

            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => sweep(&registry, diagnostics).await,
                }
            }

            info!("Cache maintenance stopped");
        });

        self.running = Some(Running { shutdown, handle });
    }

    // == Stop ==
    /// Signals the loop to exit and waits for it. A sweep already in progress
    /// finishes first.
    pub async fn stop(&mut self) {
        let Some(Running { shutdown, handle }) = self.running.take() else {
            return;
        };

        // The receiver is gone only if the task already ended
        let _ = shutdown.send(());
        if let Err(e) = handle.await {
            warn!("Cache maintenance task ended abnormally: {}", e);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }
}

impl Drop for MaintenanceScheduler {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.abort();
        }
    }
}

/// One maintenance pass over every cache.
async fn sweep(registry: &CacheRegistry, diagnostics: bool) {
    for (kind, removed) in registry.prune_all().await {
        if removed > 0 {
            info!(cache = %kind, removed, "Cache prune: removed expired entries");
        } else {
            debug!(cache = %kind, "Cache prune: no expired entries found");
        }
    }

    if diagnostics {
        for (kind, stats) in registry.stats().await {
            info!(
                cache = %kind,
                hits = stats.hits,
                misses = stats.misses,
                evictions = stats.evictions,
                size = stats.size,
                hit_rate = stats.hit_rate(),
                "Cache stats"
            );
        }
    }
}
