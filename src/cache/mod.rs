//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, oldest-insertion eviction,
//! pattern invalidation and hit/miss statistics, plus the key conventions
//! callers use to address it.

mod engine;
mod entry;
pub mod keys;
mod order;
mod pattern;
mod stats;
mod store;


// Re-export public types
pub use engine::{Cache, CacheProfile, QueryCache};
pub use entry::CacheEntry;
pub use order::InsertionOrder;
pub use pattern::KeyPattern;
pub use stats::CacheStats;
pub use store::CacheStore;
