//! Error types for the cache crate
//!
//! Cache operations are total and never fail; only configuration loading
//! reports errors.

use thiserror::Error;

// == Config Error Enum ==
/// Error raised while loading a [`CacheConfig`](crate::CacheConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but does not parse
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

// == Result Type Alias ==
/// Convenience Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
