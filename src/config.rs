//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheProfile;
use crate::error::{CacheError, Result};

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Short-lived cache for general query results
    pub query: CacheProfile,
    /// Per-user mutable data
    pub user: CacheProfile,
    /// Rarely changing reference data
    pub reference: CacheProfile,
    /// HTTP port for the diagnostics and webhook surface
    pub server_port: u16,
    /// Interval in seconds between maintenance sweeps
    pub prune_interval: u64,
    /// Log per-cache statistics on every maintenance sweep
    pub diagnostics: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `QUERY_CACHE_TTL` / `QUERY_CACHE_MAX_ENTRIES` (default: 300s / 1000)
    /// - `USER_CACHE_TTL` / `USER_CACHE_MAX_ENTRIES` (default: 60s / 500)
    /// - `REFERENCE_CACHE_TTL` / `REFERENCE_CACHE_MAX_ENTRIES` (default: 3600s / 200)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PRUNE_INTERVAL` - Maintenance frequency in seconds (default: 60)
    /// - `CACHE_DIAGNOSTICS` - `true`/`false` (default: on in debug builds)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            query: profile_from_env("QUERY_CACHE", defaults.query),
            user: profile_from_env("USER_CACHE", defaults.user),
            reference: profile_from_env("REFERENCE_CACHE", defaults.reference),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            prune_interval: env_or("PRUNE_INTERVAL", defaults.prune_interval),
            diagnostics: env_or("CACHE_DIAGNOSTICS", defaults.diagnostics),
        }
    }

    /// Rejects configurations that would leave a cache unable to hold entries
    /// or the maintenance task spinning.
    pub fn validate(&self) -> Result<()> {
        self.query.validate("query")?;
        self.user.validate("user")?;
        self.reference.validate("reference")?;

        if self.prune_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "prune_interval must be at least one second".to_string(),
            ));
        }

        Ok(())
    }

    /// Interval between maintenance sweeps.
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query: CacheProfile::new(Duration::from_secs(300), 1000),
            user: CacheProfile::new(Duration::from_secs(60), 500),
            reference: CacheProfile::new(Duration::from_secs(3600), 200),
            server_port: 3000,
            prune_interval: 60,
            diagnostics: cfg!(debug_assertions),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn profile_from_env(prefix: &str, default: CacheProfile) -> CacheProfile {
    let ttl_secs = env_or(&format!("{prefix}_TTL"), default.default_ttl.as_secs());
    let max_entries = env_or(&format!("{prefix}_MAX_ENTRIES"), default.max_entries);
    CacheProfile::new(Duration::from_secs(ttl_secs), max_entries)
}
