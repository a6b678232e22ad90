//! Cache Entry Module
//!
//! Defines the arena node backing every cached mapping, plus the clock helpers
//! used for TTL expiration.

use chrono::{DateTime, TimeDelta, Utc};

// == Cache Entry ==
/// A single slot of the ordering list.
///
/// Real entries carry a key and a value. The two sentinels and any slot sitting
/// on the free list carry neither.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    pub(crate) key: Option<K>,
    pub(crate) value: Option<V>,
    /// Absolute expiration instant, None = never expires
    pub(crate) expires_at: Option<DateTime<Utc>>,
    pub(crate) prev: usize,
    pub(crate) next: usize,
}

impl<K, V> Entry<K, V> {
    // == Constructors ==
    /// Creates a detached entry holding a mapping.
    pub(crate) fn new(key: K, value: V, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            key: Some(key),
            value: Some(value),
            expires_at,
            prev: 0,
            next: 0,
        }
    }

    /// Creates a data-free boundary node linked between `prev` and `next`.
    pub(crate) fn sentinel(prev: usize, next: usize) -> Self {
        Self {
            key: None,
            value: None,
            expires_at: None,
            prev,
            next,
        }
    }

    // == Accessors ==
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns true if the slot holds a mapping.
    pub fn is_occupied(&self) -> bool {
        self.key.is_some()
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once its expiration instant is strictly earlier than
    /// the current time. Entries without a TTL never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_time())
    }

    /// Same as [`Entry::is_expired`] against an explicit instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => expires < now,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(TimeDelta::zero())` if the entry has expired
    /// - `Some(remaining)` if the entry has a TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.expires_at.map(|expires| {
            if expires > now {
                expires.signed_duration_since(now)
            } else {
                TimeDelta::zero()
            }
        })
    }

    /// Takes the mapping out of the slot, leaving it empty.
    pub(crate) fn take(&mut self) -> Option<(K, V)> {
        self.expires_at = None;
        match (self.key.take(), self.value.take()) {
            (Some(key), Some(value)) => Some((key, value)),
            _ => None,
        }
    }
}

// == Utility Functions ==
/// Returns the current wall-clock time.
pub fn current_time() -> DateTime<Utc> {
    Utc::now()
}

/// Computes `now + ttl`, saturating at the representable time range instead of
/// overflowing.
pub fn deadline(now: DateTime<Utc>, ttl: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(if ttl < TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Converts a millisecond count into a TTL. Negative values are kept.
pub fn ttl_from_millis(millis: i64) -> TimeDelta {
    TimeDelta::try_milliseconds(millis).unwrap_or(TimeDelta::MIN)
}
