// Cache entry wrapper with age-based expiry.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// TTL for cached GitHub data: 24 hours.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Wrapper for cached data with its write timestamp.
///
/// The timestamp is stored as epoch milliseconds; age is always computed
/// against the wall clock at read time, never at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached, as epoch milliseconds.
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    /// Create a new entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Age of this entry relative to the current wall-clock time.
    ///
    /// An entry stamped in the future has age zero.
    pub fn age(&self) -> Duration {
        let elapsed = Utc::now().timestamp_millis() - self.timestamp;
        Duration::from_millis(elapsed.max(0) as u64)
    }

    /// Check if this entry has expired based on TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }

    /// Check if this entry is still fresh (not expired).
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.is_expired(ttl)
    }
}
