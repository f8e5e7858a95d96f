//! Metadata lookups behind a TTL cache.

use std::sync::Arc;

use async_trait::async_trait;

use super::MetadataService;
use crate::cache::CacheConfig;
use crate::cache::CacheProvider;
use crate::cache::CacheEntry;
use crate::cache::InMemoryCache;
use crate::error::CacheError;
use crate::error::ServiceError;
use crate::model::ObjectInfo;

/// Wraps a [`MetadataService`] and caches object info per API name.
///
/// Object schemas rarely change during a session, so repeated grid loads for
/// the same object are served from the cache until the TTL runs out. Cache
/// entries that fail to decode are treated as misses.
///
/// # Example
///
/// ```ignore
/// let service = CachedMetadataService::new(remote_metadata)
///     .with_config(CacheConfig::default().with_metadata_ttl(Duration::from_secs(600)));
/// let info = service.object_info("Account").await?;
/// ```
pub struct CachedMetadataService<S> {
    inner: S,
    cache: Arc<dyn CacheProvider>,
    config: CacheConfig,
}

impl<S: MetadataService> CachedMetadataService<S> {
    /// Wraps a service with an in-memory cache and default TTLs.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Arc::new(InMemoryCache::new()),
            config: CacheConfig::default(),
        }
    }

    /// Uses a different cache provider.
    pub fn with_cache(mut self, cache: Arc<dyn CacheProvider>) -> Self {
        self.cache = cache;
        self
    }

    /// Uses a different cache configuration.
    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Drops the cached entry for an object.
    pub async fn invalidate(&self, api_name: &str) {
        self.cache.evict(&cache_key(api_name)).await;
    }
}

fn cache_key(api_name: &str) -> String {
    format!("object_info:{}", api_name)
}

fn encode(info: &ObjectInfo) -> Result<Vec<u8>, CacheError> {
    serde_json::to_vec(info).map_err(CacheError::Serialization)
}

fn decode(bytes: &[u8]) -> Result<ObjectInfo, CacheError> {
    serde_json::from_slice(bytes).map_err(CacheError::Deserialization)
}

#[async_trait]
impl<S: MetadataService> MetadataService for CachedMetadataService<S> {
    async fn object_info(&self, api_name: &str) -> Result<ObjectInfo, ServiceError> {
        if self.config.is_disabled() {
            return self.inner.object_info(api_name).await;
        }

        let key = cache_key(api_name);
        if let Some(cached) = self.cache.load(&key).await {
            match decode(&cached.bytes) {
                Ok(info) => {
                    log::trace!("Object info cache hit: {}", api_name);
                    return Ok(info);
                }
                Err(e) => log::warn!("Discarding cached object info for {}: {}", api_name, e),
            }
        }

        let info = self.inner.object_info(api_name).await?;
        match encode(&info) {
            Ok(bytes) => {
                self.cache
                    .store(&key, CacheEntry::fresh(bytes, self.config.metadata_ttl))
                    .await
            }
            Err(e) => log::warn!("Not caching object info for {}: {}", api_name, e),
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;

    #[derive(Default)]
    struct CountingService {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataService for CountingService {
        async fn object_info(&self, api_name: &str) -> Result<ObjectInfo, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if api_name == "Missing" {
                return Err(ServiceError::message("not found"));
            }
            Ok(ObjectInfo::new(api_name))
        }
    }

    #[tokio::test]
    async fn test_second_lookup_is_cached() {
        let service = CachedMetadataService::new(CountingService::default());

        assert_eq!(service.object_info("Account").await.unwrap().api_name, "Account");
        assert_eq!(service.object_info("Account").await.unwrap().api_name, "Account");
        assert_eq!(service.inner.calls.load(Ordering::SeqCst), 1);

        service.invalidate("Account").await;
        service.object_info("Account").await.unwrap();
        assert_eq!(service.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let service = CachedMetadataService::new(CountingService::default());

        assert!(service.object_info("Missing").await.is_err());
        assert!(service.object_info("Missing").await.is_err());
        assert_eq!(service.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_cache_config_bypasses_cache() {
        let service = CachedMetadataService::new(CountingService::default())
            .with_config(CacheConfig::no_cache());

        service.object_info("Account").await.unwrap();
        service.object_info("Account").await.unwrap();
        assert_eq!(service.inner.calls.load(Ordering::SeqCst), 2);
    }
}
