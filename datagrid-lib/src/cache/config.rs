//! Cache lifetime settings

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

/// How long object info stays cached.
///
/// Loads from JSON with the TTL in whole seconds (`metadataTtlSecs`); a TTL of
/// zero turns caching off.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagrid_lib::cache::CacheConfig;
///
/// let config: CacheConfig = serde_json::from_str(r#"{"metadataTtlSecs": 600}"#).unwrap();
/// assert_eq!(config.metadata_ttl, Duration::from_secs(600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    /// Default: 1 hour
    #[serde(rename = "metadataTtlSecs", with = "secs")]
    pub metadata_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            metadata_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl CacheConfig {
    pub fn with_metadata_ttl(mut self, ttl: Duration) -> Self {
        self.metadata_ttl = ttl;
        self
    }

    /// Always asks the wrapped service.
    pub fn no_cache() -> Self {
        Self {
            metadata_ttl: Duration::ZERO,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.metadata_ttl.is_zero()
    }
}

mod secs {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(ttl.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_one_hour() {
        let config: CacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.metadata_ttl, Duration::from_secs(3600));
        assert!(!config.is_disabled());
        assert!(CacheConfig::no_cache().is_disabled());
    }
}
