//! Cache Engine Module
//!
//! Thread-safe, async get-or-compute cache built on `CacheStore`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::debug;

use crate::cache::{CacheStats, CacheStore, KeyPattern};
use crate::error::{CacheError, Result};

// == Cache Profile ==
/// TTL and capacity settings for one named cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheProfile {
    /// TTL for entries written without an override
    pub default_ttl: Duration,
    /// Maximum number of entries held at once
    pub max_entries: usize,
}

impl CacheProfile {
    pub const fn new(default_ttl: Duration, max_entries: usize) -> Self {
        Self {
            default_ttl,
            max_entries,
        }
    }

    /// Fails if a cache built from this profile could never hold an entry.
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "cache '{name}': max_entries must be greater than zero"
            )));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidConfig(format!(
                "cache '{name}': default_ttl must be greater than zero"
            )));
        }
        Ok(())
    }
}

/// Shared slot for one in-progress computation.
struct Flight<V> {
    cell: OnceCell<V>,
    /// Set once the key is invalidated while the computation runs; the
    /// result is then handed to its waiters but never stored.
    invalidated: AtomicBool,
}

impl<V> Flight<V> {
    fn invalidate(&self) {
        self.invalidated.store(true, Ordering::Release);
    }

    fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::Acquire)
    }
}

impl<V> Default for Flight<V> {
    fn default() -> Self {
        Self {
            cell: OnceCell::new(),
            invalidated: AtomicBool::new(false),
        }
    }
}

// == Cache ==
/// Named get-or-compute cache.
///
/// All state sits behind a `tokio::sync::RwLock`; no lock is held while a
/// compute function runs. Concurrent misses for the same key share a single
/// computation through the in-flight table.
///
/// Lock order is `in_flight` before `store` wherever both are held.
pub struct Cache<V> {
    name: String,
    profile: CacheProfile,
    store: RwLock<CacheStore<V>>,
    in_flight: Mutex<HashMap<String, Arc<Flight<V>>>>,
}

/// Cache holding JSON query results.
pub type QueryCache = Cache<Value>;

impl<V: Clone> Cache<V> {
    // == Constructor ==
    /// Creates an empty cache, rejecting unusable profiles.
    pub fn new(name: impl Into<String>, profile: CacheProfile) -> Result<Self> {
        let name = name.into();
        profile.validate(&name)?;

        Ok(Self {
            store: RwLock::new(CacheStore::new(profile.max_entries, profile.default_ttl)),
            in_flight: Mutex::new(HashMap::new()),
            name,
            profile,
        })
    }

    // == Get ==
    /// Returns the cached value for `key`, or runs `compute` and caches its result.
    ///
    /// A valid entry counts as a hit and `compute` is not called. Otherwise the
    /// call counts as a miss and the value comes from a computation: either a
    /// fresh one, stored with `ttl` (or the default TTL) once it succeeds, or
    /// one already running for the same key. Errors from `compute` are returned
    /// unchanged and nothing is stored. A result whose key was invalidated
    /// while it was being computed is returned but not stored.
    pub async fn get<F, Fut, E>(
        &self,
        key: &str,
        compute: F,
        ttl: Option<Duration>,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let cached = self.store.write().await.lookup(key);
        if let Some(value) = cached {
            debug!(cache = %self.name, key, "cache hit");
            return Ok(value);
        }
        debug!(cache = %self.name, key, "cache miss");

        let flight = self.join_flight(key).await;
        let slot = &flight;
        let outcome = flight
            .cell
            .get_or_try_init(move || async move {
                // A flight that finished just before this one registered may
                // already have stored a fresh value.
                let stored = self.store.read().await.peek(key);
                if let Some(value) = stored {
                    return Ok(value);
                }

                let value = compute().await?;
                self.land_flight(key, slot, value.clone(), ttl).await;
                Ok::<V, E>(value)
            })
            .await
            .cloned();

        self.leave_flight(key, &flight).await;
        outcome
    }

    // == Set ==
    /// Stores a value, evicting the oldest inserted entry if the cache is full.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let evicted = self.store.write().await.set(key.clone(), value, ttl);

        if let Some(evicted) = evicted {
            debug!(cache = %self.name, key = %key, evicted = %evicted, "evicted oldest entry");
        }
    }

    // == Peek ==
    /// Reads a valid entry without counting a hit or miss.
    pub async fn peek(&self, key: &str) -> Option<V> {
        self.store.read().await.peek(key)
    }

    // == Invalidate ==
    /// Removes the entry for `key`; absent keys are ignored.
    pub async fn invalidate(&self, key: &str) {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(flight) = in_flight.remove(key) {
            flight.invalidate();
        }
        let removed = self.store.write().await.remove(key);
        drop(in_flight);

        if removed {
            debug!(cache = %self.name, key, "invalidated entry");
        }
    }

    // == Invalidate Pattern ==
    /// Removes every entry whose key matches `pattern`.
    ///
    /// Returns the number of entries removed; zero is a normal outcome.
    pub async fn invalidate_pattern(&self, pattern: &KeyPattern) -> usize {
        let mut in_flight = self.in_flight.lock().await;
        in_flight.retain(|key, flight| {
            let stale = pattern.matches(key);
            if stale {
                flight.invalidate();
            }
            !stale
        });
        let removed = self.store.write().await.remove_matching(pattern);
        drop(in_flight);

        if removed > 0 {
            debug!(cache = %self.name, %pattern, removed, "invalidated entries by pattern");
        }
        removed
    }

    // == Clear ==
    /// Drops all entries and resets statistics.
    pub async fn clear(&self) {
        let mut in_flight = self.in_flight.lock().await;
        in_flight.drain().for_each(|(_, flight)| flight.invalidate());
        self.store.write().await.clear();
        drop(in_flight);
        debug!(cache = %self.name, "cleared");
    }

    // == Prune ==
    /// Removes every entry that has outlived its own TTL.
    ///
    /// Expired keys are collected under a read lock and then removed one at a
    /// time, so concurrent callers wait at most for a single removal. An entry
    /// rewritten in between is left alone.
    pub async fn prune(&self) -> usize {
        let candidates = self.store.read().await.expired_keys();

        let mut removed = 0;
        for key in candidates {
            if self.store.write().await.remove_if_expired(&key) {
                removed += 1;
            }
        }
        removed
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Successful reads of the current entry for `key`.
    pub async fn hit_count(&self, key: &str) -> Option<u64> {
        self.store.read().await.entry(key).map(|entry| entry.hit_count)
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> CacheProfile {
        self.profile
    }

    async fn join_flight(&self, key: &str) -> Arc<Flight<V>> {
        self.in_flight
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Stores a computed value unless its key was invalidated mid-flight.
    ///
    /// Holding `in_flight` across the check and the write keeps a concurrent
    /// invalidation either fully before or fully after the store.
    async fn land_flight(&self, key: &str, flight: &Flight<V>, value: V, ttl: Option<Duration>) {
        let in_flight = self.in_flight.lock().await;
        if flight.is_invalidated() {
            debug!(cache = %self.name, key, "discarding result invalidated mid-flight");
            return;
        }
        self.set(key, value, ttl).await;
        drop(in_flight);
    }

    async fn leave_flight(&self, key: &str, flight: &Arc<Flight<V>>) {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, flight))
        {
            in_flight.remove(key);
        }
    }
}

impl QueryCache {
    /// Typed `get` over JSON storage.
    ///
    /// The computed value is stored as JSON and converted back to `T` on every
    /// read. Conversion failures surface as `CacheError::Serialization`.
    pub async fn get_json<T, F, Fut, E>(
        &self,
        key: &str,
        compute: F,
        ttl: Option<Duration>,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<CacheError>,
    {
        let value = self
            .get(
                key,
                move || async move {
                    compute().await.and_then(|typed| {
                        serde_json::to_value(typed).map_err(|e| E::from(CacheError::from(e)))
                    })
                },
                ttl,
            )
            .await?;

        serde_json::from_value(value).map_err(|e| E::from(CacheError::from(e)))
    }
}

impl<V> std::fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}
