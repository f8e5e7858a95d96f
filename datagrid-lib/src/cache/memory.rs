//! Process-local cache on a concurrent map

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use dashmap::DashMap;

use super::CacheEntry;
use super::CacheProvider;

/// Hit and miss counters of an [`InMemoryCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// A [`CacheProvider`] held in a `DashMap`.
///
/// Stale entries are removed lazily on lookup or by
/// [`purge_stale`](CacheProvider::purge_stale).
///
/// # Example
///
/// ```
/// use datagrid_lib::cache::InMemoryCache;
///
/// let cache = InMemoryCache::new();
/// assert!(cache.is_empty());
/// assert_eq!(cache.stats().hits, 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns lookup counters since creation.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl CacheProvider for InMemoryCache {
    async fn load(&self, key: &str) -> Option<CacheEntry> {
        // remove_if takes the shard lock, so the read guard must be gone first
        let live = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_stale()).then(|| entry.clone()));

        match live {
            Some(Some(entry)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry)
            }
            Some(None) => {
                self.entries.remove_if(key, |_, entry| entry.is_stale());
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn store(&self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_owned(), entry);
    }

    async fn evict(&self, key: &str) {
        self.entries.remove(key);
    }

    async fn evict_all(&self) {
        self.entries.clear();
    }

    async fn purge_stale(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_stale());
        before.saturating_sub(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_store_load_evict() {
        let cache = InMemoryCache::new();
        cache
            .store("object_info:Account", CacheEntry::fresh(b"{}".to_vec(), Duration::from_secs(60)))
            .await;

        let entry = cache.load("object_info:Account").await;
        assert_eq!(entry.map(|e| e.bytes), Some(b"{}".to_vec()));

        cache.evict("object_info:Account").await;
        assert!(cache.load("object_info:Account").await.is_none());
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn test_stale_entries_are_dropped() {
        let cache = InMemoryCache::new();
        cache.store("stale", CacheEntry::fresh(Vec::new(), Duration::ZERO)).await;
        cache.store("other", CacheEntry::fresh(Vec::new(), Duration::ZERO)).await;
        cache
            .store("live", CacheEntry::fresh(Vec::new(), Duration::from_secs(60)))
            .await;

        assert!(cache.load("stale").await.is_none());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.purge_stale().await, 1);
        assert_eq!(cache.len(), 1);

        cache.evict_all().await;
        assert!(cache.is_empty());
    }
}
