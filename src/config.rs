//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::ttl_from_millis;
use crate::error::{ConfigError, Result};

/// Environment variable holding the cache capacity
pub const CAPACITY_VAR: &str = "LRU_CAPACITY";
/// Environment variable holding the default TTL in milliseconds
pub const DEFAULT_TTL_VAR: &str = "LRU_DEFAULT_TTL_MS";

/// Capacity used when none is configured
pub const DEFAULT_CAPACITY: i64 = 1000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults, or deserialized from the host's own configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold, <= 0 retains nothing
    pub capacity: i64,
    /// Default TTL in milliseconds for entries set without one, None = never expire
    pub default_ttl_ms: Option<i64>,
}

impl CacheConfig {
    /// Creates a new CacheConfig from environment variables, falling back to
    /// the default for any variable that is unset or fails to parse.
    ///
    /// # Environment Variables
    /// - `LRU_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `LRU_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let lookup = |var: &str| env::var(var).ok();

        Self {
            capacity: parse_field(lookup, CAPACITY_VAR)
                .unwrap_or_else(fallback)
                .unwrap_or(defaults.capacity),
            default_ttl_ms: parse_field(lookup, DEFAULT_TTL_VAR)
                .unwrap_or_else(fallback)
                .or(defaults.default_ttl_ms),
        }
    }

    /// Strict variant of [`CacheConfig::from_env`]: an unparsable value is an
    /// error instead of a fallback.
    pub fn try_from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            capacity: parse_field(&lookup, CAPACITY_VAR)?.unwrap_or(defaults.capacity),
            default_ttl_ms: parse_field(&lookup, DEFAULT_TTL_VAR)?.or(defaults.default_ttl_ms),
        })
    }

    /// Returns the default TTL as a duration.
    pub fn default_ttl(&self) -> Option<TimeDelta> {
        self.default_ttl_ms.map(ttl_from_millis)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            default_ttl_ms: None,
        }
    }
}

fn parse_field<T, F>(lookup: F, var: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|err: T::Err| ConfigError::InvalidValue {
            var,
            value: raw.clone(),
            reason: err.to_string(),
        })
}

fn fallback<T>(err: ConfigError) -> Option<T> {
    warn!("{}, using default", err);
    None
}
