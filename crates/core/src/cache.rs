//! In-memory cache with a fixed time-to-live.
//!
//! Values are cloned out on read so nothing handed to a caller can be
//! mutated in place. Concurrent misses on the same key may both compute;
//! the last writer wins.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe TTL cache.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get a live entry.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.inserted_at.elapsed() < self.ttl)
            .map(|e| e.value.clone())
    }

    /// Insert or replace an entry, restarting its TTL.
    ///
    /// Expired entries are dropped on every insert.
    pub async fn insert(&self, key: K, value: V) {
        let ttl = self.ttl;
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// The lock is not held while `compute` runs. Errors are not cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            crate::metrics::CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
            return Ok(value);
        }
        crate::metrics::CACHE_LOOKUPS.with_label_values(&["miss"]).inc();

        let value = compute().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Number of stored entries, live or expired.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a".to_string(), 1).await;

        assert_eq!(cache.get(&"a".to_string()).await, Some(1));
        assert_eq!(cache.get(&"b".to_string()).await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_never_hits() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert(1u32, "value").await;

        assert_eq!(cache.get(&1).await, None);
    }

    #[tokio::test]
    async fn test_insert_drops_expired_entries() {
        let cache = TtlCache::new(Duration::ZERO);
        for n in 0..1000u32 {
            cache.insert(n, n).await;
        }
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_freed_after_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("old", 1).await;
        cache.insert("older", 2).await;
        assert_eq!(cache.len().await, 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.insert("new", 3).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"new").await, Some(3));
        assert_eq!(cache.get(&"old").await, None);
    }

    #[tokio::test]
    async fn test_get_or_try_insert_with_computes_once() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<Option<String>, ()> = cache
                .get_or_try_insert_with("key", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some("slug".to_string()))
                })
                .await;
            assert_eq!(value.unwrap().as_deref(), Some("slug"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));

        let first: Result<u32, &str> = cache
            .get_or_try_insert_with("key", || async { Err("boom") })
            .await;
        assert_eq!(first, Err("boom"));
        assert!(cache.is_empty().await);

        let second: Result<u32, &str> = cache
            .get_or_try_insert_with("key", || async { Ok(7) })
            .await;
        assert_eq!(second, Ok(7));
    }
}
