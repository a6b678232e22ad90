//! Cache Module
//!
//! Provides the bounded LRU cache with lazy TTL expiration.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_time, deadline, ttl_from_millis, Entry};
pub use lru::{Iter as ListIter, LruList};
pub use stats::CacheStats;
pub use store::LruCache;
