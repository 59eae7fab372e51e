//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// `inserted_at` is fixed when the entry is created and never refreshed by a
/// read, so expiry is absolute from insertion.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion instant
    pub inserted_at: Instant,
    /// Effective TTL (override given at insertion, or the cache default)
    pub ttl: Duration,
    /// Number of successful reads, diagnostic only
    pub hit_count: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current instant.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
            hit_count: 0,
        }
    }

    // == Age ==
    /// Time elapsed since insertion.
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry whose age equals its TTL is expired, so an
    /// entry is valid only while `age < ttl`.
    pub fn is_expired(&self) -> bool {
        self.age() >= self.ttl
    }

    // == Time To Live ==
    /// Returns the remaining freshness window, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.age())
    }
}
