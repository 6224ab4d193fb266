//! Best-effort cache abstraction.
//!
//! The cache is pure optimization: every value it holds (aggregate count,
//! shard count, error tally, growth-task marker) is derived, disposable
//! state with a store-backed fallback. For that reason the [`Cache`] trait
//! is infallible: an implementation that cannot reach its backend behaves
//! as if every key were absent, and callers carry on against the store.
//!
//! All values are signed integers, which covers everything this subsystem
//! caches. Mutation of shared soft state goes through the atomic
//! [`increment`](Cache::increment)/[`increment_or`](Cache::increment_or)
//! primitives, never through read-modify-write on `get`/`put`.

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;

/// A TTL-based, never-authoritative key/value cache.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the cached value, or `None` on miss or expiry.
    async fn get(&self, key: &str) -> Option<i64>;

    /// Stores `value` under `key`. `ttl: None` stores without expiry.
    async fn put(&self, key: &str, value: i64, ttl: Option<Duration>);

    /// Atomically adds `delta` to an existing entry, returning the new
    /// value. A miss is a no-op returning `None`; callers must not assume
    /// the entry is created.
    async fn increment(&self, key: &str, delta: i64) -> Option<i64>;

    /// Atomically adds `delta` to an existing entry, or installs `initial`
    /// (keeping the entry's remaining TTL untouched on hit). Returns the
    /// resulting value.
    async fn increment_or(&self, key: &str, delta: i64, initial: i64) -> i64;

    /// Removes the entry, if present.
    async fn delete(&self, key: &str);
}
