//! TTL cache for object schema lookups
//!
//! Object info is stored as JSON bytes under string keys so any
//! [`CacheProvider`] can hold it without knowing the type. The grid uses this
//! through [`CachedMetadataService`](crate::service::CachedMetadataService).

mod config;
mod memory;

pub use config::*;
pub use memory::*;

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

/// Serialized payload plus its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// JSON-encoded payload.
    pub bytes: Vec<u8>,
    pub stored_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Stamps `bytes` as stored now, valid for `ttl`.
    ///
    /// A TTL too large for `chrono` is clamped to zero, so the entry is
    /// immediately stale.
    pub fn fresh(bytes: Vec<u8>, ttl: Duration) -> Self {
        let stored_at = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            bytes,
            stored_at,
            expires_at: stored_at + ttl,
        }
    }

    /// Returns `true` once `now` has reached the expiry.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns `true` if the entry has expired.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now())
    }
}

/// Key-value storage for [`CacheEntry`] values.
///
/// `load` must never hand back a stale entry.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Returns the live entry for `key`.
    async fn load(&self, key: &str) -> Option<CacheEntry>;

    /// Stores or replaces the entry for `key`.
    async fn store(&self, key: &str, entry: CacheEntry);

    /// Drops the entry for `key`.
    async fn evict(&self, key: &str);

    /// Drops every entry.
    async fn evict_all(&self);

    /// Drops stale entries and returns how many went.
    async fn purge_stale(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ttl_is_stale() {
        assert!(CacheEntry::fresh(b"{}".to_vec(), Duration::ZERO).is_stale());
    }

    #[test]
    fn test_stale_after_expiry() {
        let entry = CacheEntry::fresh(b"{}".to_vec(), Duration::from_secs(60));
        assert!(!entry.is_stale());
        assert!(!entry.is_stale_at(entry.stored_at + chrono::Duration::seconds(59)));
        assert!(entry.is_stale_at(entry.stored_at + chrono::Duration::seconds(60)));
    }
}
