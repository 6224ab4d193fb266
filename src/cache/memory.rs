//! In-memory [`Cache`] with TTL expiry on tokio time.
//!
//! Expiry is lazy: entries are dropped when a lookup or mutation finds them
//! past their deadline. Time comes from [`tokio::time::Instant`], so tests
//! running under a paused clock can advance expiry deterministically.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::cache::Cache;

struct Entry {
    value: i64,
    expires: Option<Instant>,
}

impl Entry {
    fn live(&self, now: Instant) -> bool {
        self.expires.map_or(true, |deadline| now < deadline)
    }
}

/// A process-local TTL cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<i64> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.live(now) => Some(entry.value),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: &str, value: i64, ttl: Option<Duration>) {
        let entry = Entry {
            value,
            expires: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.to_string(), entry);
    }

    async fn increment(&self, key: &str, delta: i64) -> Option<i64> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get_mut(key) {
            Some(entry) if entry.live(now) => {
                entry.value += delta;
                Some(entry.value)
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn increment_or(&self, key: &str, delta: i64, initial: i64) -> i64 {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get_mut(key) {
            Some(entry) if entry.live(now) => {
                entry.value += delta;
                entry.value
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: initial,
                        expires: None,
                    },
                );
                initial
            }
        }
    }

    async fn delete(&self, key: &str) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("k").await, None);

        cache.put("k", 42, None).await;
        assert_eq!(cache.get("k").await, Some(42));

        cache.delete("k").await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let cache = MemoryCache::new();
        cache.put("k", 1, Some(Duration::from_secs(5))).await;
        assert_eq!(cache.get("k").await, Some(1));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_increment_misses_are_noops() {
        let cache = MemoryCache::new();
        assert_eq!(cache.increment("k", 1).await, None);
        assert_eq!(cache.get("k").await, None);

        cache.put("k", 10, None).await;
        assert_eq!(cache.increment("k", 5).await, Some(15));
        assert_eq!(cache.get("k").await, Some(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_increment_on_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache.put("k", 7, Some(Duration::from_secs(1))).await;
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.increment("k", 1).await, None);
    }

    #[tokio::test]
    async fn test_increment_or_initializes_then_adds() {
        let cache = MemoryCache::new();
        assert_eq!(cache.increment_or("errors", 1, 1).await, 1);
        assert_eq!(cache.increment_or("errors", 1, 1).await, 2);
        assert_eq!(cache.increment_or("errors", 1, 1).await, 3);
        assert_eq!(cache.get("errors").await, Some(3));
    }
}
