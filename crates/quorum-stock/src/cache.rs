//! Timed caching for provider responses to reduce API calls

use cached::{Cached, TimedCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key for provider requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Stock ticker
    pub ticker: String,
    /// Capability or endpoint name
    pub endpoint: String,
    /// Additional parameters as JSON string
    pub params: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(
        ticker: impl Into<String>,
        endpoint: impl Into<String>,
        params: impl Serialize,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            endpoint: endpoint.into(),
            params: serde_json::to_string(&params).unwrap_or_default(),
        }
    }
}

/// Thread-safe timed cache for provider data
pub struct MarketCache {
    cache: Arc<RwLock<TimedCache<CacheKey, serde_json::Value>>>,
}

impl MarketCache {
    /// Create a new cache with the specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: CacheKey, value: serde_json::Value) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Get or fetch a value using the provided fetcher function
    ///
    /// Cache hits return immediately; misses run the fetcher and store the
    /// result.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: CacheKey,
        fetcher: F,
    ) -> Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<serde_json::Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!("Cache hit for key: {:?}", key);
            return Ok(value);
        }

        tracing::debug!("Cache miss for key: {:?}", key);

        let value = fetcher().await?;
        self.insert(key, value.clone()).await;

        Ok(value)
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for MarketCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_key_creation() {
        let key = CacheKey::new("AAPL", "price", serde_json::json!({"range": "1d"}));
        assert_eq!(key.ticker, "AAPL");
        assert_eq!(key.endpoint, "price");
        assert!(key.params.contains("range"));
    }

    #[tokio::test]
    async fn test_cache_insert_and_get() {
        let cache = MarketCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "price", serde_json::json!({}));
        let value = serde_json::json!({"price": 150.0});

        cache.insert(key.clone(), value.clone()).await;

        assert_eq!(cache.get(&key).await, Some(value));
    }

    #[tokio::test]
    async fn test_cache_get_or_fetch_runs_fetcher_once() {
        let cache = MarketCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "price", serde_json::json!({}));
        let value = serde_json::json!({"price": 150.0});

        let mut call_count = 0;
        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(value.clone()) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(call_count, 1);

        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(value.clone()) }
            })
            .await
            .unwrap();
        assert_eq!(result, value);
        assert_eq!(call_count, 1);
    }

    #[tokio::test]
    async fn test_cache_clear() {
        let cache = MarketCache::new(Duration::from_secs(60));

        for i in 0..3 {
            let key = CacheKey::new(format!("STOCK{i}"), "price", serde_json::json!({}));
            cache.insert(key, serde_json::json!({"price": i})).await;
        }
        assert_eq!(cache.len().await, 3);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
