//! LRU TTL Cache - a bounded in-process key-value cache
//!
//! Provides least-recently-used eviction with optional lazy TTL expiration.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStats, LruCache};
pub use chrono::TimeDelta;
pub use config::CacheConfig;
pub use error::{ConfigError, Result};
