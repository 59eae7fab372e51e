//! Cache Store Module
//!
//! Synchronous entry store combining HashMap storage with insertion-order
//! tracking and TTL expiration. `Cache` wraps it behind a lock.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStats, InsertionOrder, KeyPattern};

// == Cache Store ==
/// Entry storage with oldest-insertion eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Write order, oldest first
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL for entries written without an override
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// `max_entries` must be non-zero; `Cache::new` enforces this.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Lookup ==
    /// Returns a clone of the value if a valid entry exists.
    ///
    /// Records a hit (and bumps the entry's hit count) or a miss. Expired
    /// entries found here are dropped.
    pub fn lookup(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.hit_count += 1;
                self.stats.record_hit();
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.remove(key);
        }
        self.stats.record_miss();
        None
    }

    // == Peek ==
    /// Returns a valid entry's value without touching statistics.
    pub fn peek(&self, key: &str) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for the key.
    ///
    /// A replaced entry gets a fresh insertion instant and a zero hit count.
    /// If the key is new and the cache is full, the oldest inserted entry is
    /// evicted first; its key is returned.
    pub fn set(&mut self, key: String, value: V, ttl: Option<Duration>) -> Option<String> {
        let mut evicted = None;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if let Some(oldest) = self.order.pop_oldest() {
                self.entries.remove(&oldest);
                self.stats.record_eviction();
                evicted = Some(oldest);
            }
        }

        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));
        self.order.record(&key);
        self.entries.insert(key, entry);

        evicted
    }

    // == Remove ==
    /// Removes an entry by key. Returns false if it was absent.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    // == Remove Matching ==
    /// Removes every entry whose key satisfies `pattern`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_matching(&mut self, pattern: &KeyPattern) -> usize {
        let matched: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect();

        for key in &matched {
            self.remove(key);
        }

        matched.len()
    }

    // == Expired Keys ==
    /// Lists keys whose entries have outlived their own TTL.
    pub fn expired_keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Removes the entry only if it is still expired.
    pub fn remove_if_expired(&mut self, key: &str) -> bool {
        let expired = self.entries.get(key).is_some_and(|entry| entry.is_expired());
        expired && self.remove(key)
    }

    // == Clear ==
    /// Drops every entry and zeroes statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.reset();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            ..self.stats.clone()
        }
    }

    pub fn entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
