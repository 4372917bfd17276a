//! In-memory caching using moka
//!
//! Product cost records are read far more often than they change, so the
//! product-backed price calculation keeps them for a short TTL.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::pricing::models::Product;

/// Application cache holding product records
#[derive(Clone)]
pub struct AppCache {
    /// Products (id -> Product)
    pub products: Cache<i32, Arc<Product>>,
}

impl AppCache {
    /// Create a cache with the given capacity and time-to-live
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            products: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Create a cache sized by the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.product_cache_capacity, config.product_cache_ttl)
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            products_size: self.products.entry_count(),
        }
    }
}

impl Default for AppCache {
    fn default() -> Self {
        // Products: 1000 entries, 1 min TTL
        Self::new(1000, Duration::from_secs(60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub products_size: u64,
}
