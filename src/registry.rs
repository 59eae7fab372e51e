//! Named Cache Registry
//!
//! The fixed set of caches a process runs with, each tuned to the volatility
//! of the data it holds. Built once at startup and shared as
//! `Arc<CacheRegistry>` with request handlers, the invalidation dispatcher and
//! the maintenance scheduler.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use crate::cache::{CacheProfile, CacheStats, QueryCache};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache Kind ==
/// Identifies one of the registry's caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    /// General query results
    Query,
    /// Per-user mutable data
    User,
    /// Rarely changing reference data
    Reference,
}

impl CacheKind {
    pub const ALL: [CacheKind; 3] = [CacheKind::Query, CacheKind::User, CacheKind::Reference];

    pub fn as_str(self) -> &'static str {
        match self {
            CacheKind::Query => "query",
            CacheKind::User => "user",
            CacheKind::Reference => "reference",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        CacheKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CacheError::UnknownCache(s.to_string()))
    }
}

// == Cache Registry ==
/// Owns every named cache in the process.
#[derive(Debug)]
pub struct CacheRegistry {
    query: QueryCache,
    user: QueryCache,
    reference: QueryCache,
}

impl CacheRegistry {
    // == Constructor ==
    /// Builds the registry from explicit profiles, failing on any unusable one.
    pub fn new(query: CacheProfile, user: CacheProfile, reference: CacheProfile) -> Result<Self> {
        let registry = Self {
            query: QueryCache::new(CacheKind::Query.as_str(), query)?,
            user: QueryCache::new(CacheKind::User.as_str(), user)?,
            reference: QueryCache::new(CacheKind::Reference.as_str(), reference)?,
        };

        for (kind, cache) in registry.iter() {
            let profile = cache.profile();
            info!(
                cache = %kind,
                ttl_secs = profile.default_ttl.as_secs_f64(),
                max_entries = profile.max_entries,
                "cache registered"
            );
        }

        Ok(registry)
    }

    /// Builds the registry from the process configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(config.query, config.user, config.reference)
    }

    pub fn get(&self, kind: CacheKind) -> &QueryCache {
        match kind {
            CacheKind::Query => &self.query,
            CacheKind::User => &self.user,
            CacheKind::Reference => &self.reference,
        }
    }

    /// Looks a cache up by its name (`query`, `user` or `reference`).
    pub fn by_name(&self, name: &str) -> Result<&QueryCache> {
        name.parse().map(|kind| self.get(kind))
    }

    pub fn query(&self) -> &QueryCache {
        &self.query
    }

    pub fn user(&self) -> &QueryCache {
        &self.user
    }

    pub fn reference(&self) -> &QueryCache {
        &self.reference
    }

    pub fn iter(&self) -> impl Iterator<Item = (CacheKind, &QueryCache)> + '_ {
        CacheKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    // == Stats ==
    /// Snapshot of every cache's statistics.
    pub async fn stats(&self) -> Vec<(CacheKind, CacheStats)> {
        let mut stats = Vec::with_capacity(CacheKind::ALL.len());
        for (kind, cache) in self.iter() {
            stats.push((kind, cache.stats().await));
        }
        stats
    }

    // == Prune All ==
    /// Prunes every cache, returning the removal count per cache.
    pub async fn prune_all(&self) -> Vec<(CacheKind, usize)> {
        let mut removed = Vec::with_capacity(CacheKind::ALL.len());
        for (kind, cache) in self.iter() {
            removed.push((kind, cache.prune().await));
        }
        removed
    }

    pub async fn clear_all(&self) {
        for (_, cache) in self.iter() {
            cache.clear().await;
        }
    }
}
