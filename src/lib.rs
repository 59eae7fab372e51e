//! Query Cache - process-local query-result cache
//!
//! Provides get-or-compute caching with TTL expiration, oldest-insertion
//! eviction, namespace invalidation driven by data-change notifications, and
//! a periodic maintenance task.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod invalidation;
pub mod models;
pub mod registry;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheProfile, CacheStats, KeyPattern, QueryCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use invalidation::{ChangeKind, DataChange, InvalidationDispatcher};
pub use registry::{CacheKind, CacheRegistry};
pub use tasks::{spawn_change_listener, MaintenanceScheduler};
