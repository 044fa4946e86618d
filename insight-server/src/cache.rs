//! Short-lived memo for aggregate results
//!
//! Entries are immutable snapshots: a refresh builds a new `Arc` and swaps
//! it in under the write lock, readers only ever clone an `Arc`. The
//! lock is never held across the recompute, so two requests that find the
//! same entry expired may both recompute; the last insert wins.

use chrono::{DateTime, Duration, Utc};
use insight_common::Clock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// One memoized value with its expiry instant
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: DateTime<Utc>,
}

/// Key -> {value, expiry} map driven by an injected clock
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, Arc<CacheEntry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::weeks(52)),
            clock,
        }
    }

    /// Fresh value for `key`, if any
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, expiring one TTL from now
    pub async fn insert(&self, key: &str, value: V) {
        let entry = Arc::new(CacheEntry {
            value,
            expires_at: self.clock.now() + self.ttl,
        });
        self.entries.write().await.insert(key.to_string(), entry);
    }

    /// Fresh value for `key`, or run `compute` and memoize its success
    ///
    /// Errors are returned as-is and never cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            debug!("cache hit: {}", key);
            return Ok(value);
        }

        debug!("cache miss: {}", key);
        let value = compute().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
