//! Insertion Order Module
//!
//! Tracks the order in which keys were written, for capacity eviction.

use std::collections::{BTreeMap, HashMap};

// == Insertion Order ==
/// Tracks write order for oldest-first eviction.
///
/// Every write stamps its key with the next sequence number:
/// - `by_seq` orders keys oldest first
/// - `seq_of` finds a key's stamp, so removal never scans
///
/// Reads never reorder keys. Only writes (insert or overwrite) move a key to
/// the newest position, which mirrors the entry's reset `inserted_at`.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    next_seq: u64,
    by_seq: BTreeMap<u64, String>,
    seq_of: HashMap<String, u64>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Marks a key as the newest insertion.
    pub fn record(&mut self, key: &str) {
        self.remove(key);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_seq.insert(seq, key.to_string());
        self.seq_of.insert(key.to_string(), seq);
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(seq) = self.seq_of.remove(key) {
            self.by_seq.remove(&seq);
        }
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest inserted key.
    ///
    /// Returns None if tracker is empty.
    pub fn pop_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_seq.pop_first()?;
        self.seq_of.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the oldest inserted key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.by_seq.first_key_value().map(|(_, key)| key)
    }

    pub fn clear(&mut self) {
        self.by_seq.clear();
        self.seq_of.clear();
    }

    pub fn len(&self) -> usize {
        self.seq_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq_of.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seq_of.contains_key(key)
    }
}
