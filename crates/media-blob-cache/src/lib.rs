//! Byte-budgeted in-memory media blob cache with LRU eviction
//!
//! Provides a cache that stores media blobs in memory with a fixed byte
//! budget, refreshing recency on every read and evicting the least recently
//! used entries whenever the budget is exceeded.

mod cache;
mod types;

pub use cache::MediaCache;
pub use types::{CacheStats, CachedBlob};
