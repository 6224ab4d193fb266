//! The counter facade: named counters, sharded writes, cached reads.
//!
//! [`Counters`] is the entry point. It owns the injected collaborators
//! (store, cache, scheduler, shard picker) and hands out per-name
//! [`Counter`] handles via [`Counters::get_or_create`]. A handle carries the
//! public operations:
//!
//! - [`Counter::increment`] is the write path. It picks one shard uniformly
//!   at random and commits `count + 1` to it under optimistic concurrency. On
//!   conflict the increment is **dropped, not retried**: contention is a
//!   signal to add capacity, and the conflict feeds the growth machinery
//!   instead of spinning on the same record.
//! - [`Counter::count`] is the read path. It serves the cached aggregate when
//!   fresh, otherwise range-scans every shard and sums. O(shard count), the
//!   expensive side of the trade intentionally kept off the write path.
//! - [`Counter::add_shards`] is explicit, monotonic growth.
//!
//! # Consistency
//!
//! `count()` is not linearizable with concurrent `increment()`s. It reflects
//! a snapshot that may lag by up to the cache TTL, or the exact store state
//! when the cache is cold. The documented guarantee is "most increments
//! land and the aggregate converges", not per-call acknowledgment; callers
//! needing exactly-once must retry whole operations themselves.

pub mod growth;
mod keys;
pub mod picker;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::Cache;
use crate::config::CounterConfig;
use crate::error::{Error, Result};
use crate::queue::TaskScheduler;
use crate::snapshot::CounterSnapshot;
use crate::store::{CounterRecord, Precondition, ShardRecord, TransactionalStore};

use keys::CacheKeys;
use picker::{ShardPicker, UniformPicker};

/// What became of one increment attempt.
///
/// `increment()` is fire-and-forget: none of these variants is an error to
/// act on, they only tell the caller which path the write took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// The increment committed to a shard.
    Applied,
    /// Lost the optimistic race on the chosen shard. The increment is
    /// dropped and counted as a contention signal.
    Conflict,
    /// Abandoned on an infrastructure failure; no contention signal.
    Dropped,
}

/// The counter service: injected collaborators plus configuration.
///
/// Cloning is cheap; all collaborators are shared.
#[derive(Clone)]
pub struct Counters {
    store: Arc<dyn TransactionalStore>,
    cache: Arc<dyn Cache>,
    scheduler: Arc<dyn TaskScheduler>,
    picker: Arc<dyn ShardPicker>,
    config: CounterConfig,
}

impl Counters {
    /// Creates a service with the default configuration and the uniform
    /// random shard picker.
    pub fn new(
        store: Arc<dyn TransactionalStore>,
        cache: Arc<dyn Cache>,
        scheduler: Arc<dyn TaskScheduler>,
    ) -> Self {
        Self {
            store,
            cache,
            scheduler,
            picker: Arc::new(UniformPicker),
            config: CounterConfig::default(),
        }
    }

    /// Replaces the configuration, returning `self` for method chaining.
    pub fn with_config(mut self, config: CounterConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the shard picker, returning `self` for method chaining.
    ///
    /// Intended for tests that need deterministic shard selection.
    pub fn with_picker(mut self, picker: Arc<dyn ShardPicker>) -> Self {
        self.picker = picker;
        self
    }

    /// Returns a handle to the counter named `name`, creating it on demand.
    ///
    /// If the counter exists it is returned as-is: an `initial_shards`
    /// larger than its current shard count does **not** grow it. If it does
    /// not exist and `initial_shards >= 1`, it is created with that many
    /// shards. With `initial_shards == 0` a missing counter is reported as
    /// [`Error::NotFound`] instead of being created.
    ///
    /// Two callers racing to create the same counter are safe: the loser of
    /// the optimistic create adopts the winner's record.
    pub async fn get_or_create(&self, name: &str, initial_shards: u32) -> Result<Counter> {
        let keys = CacheKeys::new(name);

        if let Some(existing) = self.store.load_counter(name).await? {
            self.cache
                .put(
                    &keys.shards,
                    i64::from(existing.value.shard_count),
                    self.config.shards_ttl,
                )
                .await;
            return Ok(self.handle(name, keys));
        }

        if initial_shards == 0 {
            return Err(Error::NotFound(name.to_string()));
        }

        let record = CounterRecord {
            name: name.to_string(),
            shard_count: initial_shards,
        };
        match self.store.store_counter(&record, Precondition::Absent).await {
            Ok(_) => {
                self.cache
                    .put(
                        &keys.shards,
                        i64::from(initial_shards),
                        self.config.shards_ttl,
                    )
                    .await;
                Ok(self.handle(name, keys))
            }
            Err(Error::Conflict) => {
                // A concurrent creator won the race; adopt its counter.
                debug!(counter = name, "lost create race, adopting existing counter");
                if let Some(existing) = self.store.load_counter(name).await? {
                    self.cache
                        .put(
                            &keys.shards,
                            i64::from(existing.value.shard_count),
                            self.config.shards_ttl,
                        )
                        .await;
                }
                Ok(self.handle(name, keys))
            }
            Err(other) => Err(other),
        }
    }

    fn handle(&self, name: &str, keys: CacheKeys) -> Counter {
        Counter {
            service: self.clone(),
            name: name.to_string(),
            keys,
        }
    }
}

impl fmt::Debug for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counters")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A handle to one named counter.
///
/// Handles are cheap to clone and hold no state beyond the name and its
/// derived cache keys; every operation reads fresh state from the cache or
/// the store.
#[derive(Clone)]
pub struct Counter {
    service: Counters,
    name: String,
    keys: CacheKeys,
}

impl Counter {
    /// Returns the counter's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds one to the counter on a randomly chosen shard.
    ///
    /// Exactly one shard is attempted. A write conflict drops the increment,
    /// bumps the counter's conflict tally, and requests a debounced growth
    /// task; it is never surfaced as an error. Infrastructure failures are
    /// logged and the increment abandoned without retry.
    pub async fn increment(&self) -> IncrementOutcome {
        let shard_count = match self.shard_count().await {
            Ok(count) => count,
            Err(error) => {
                warn!(counter = %self.name, %error, "increment abandoned: shard count unavailable");
                return IncrementOutcome::Dropped;
            }
        };

        let index = self.service.picker.pick(shard_count);
        match self.write_shard(index).await {
            Ok(()) => {
                // Keep the cached aggregate warm; a miss means the next
                // count() recomputes from the store anyway.
                self.service.cache.increment(&self.keys.count, 1).await;
                IncrementOutcome::Applied
            }
            Err(Error::Conflict) => {
                warn!(counter = %self.name, shard = index, "write conflict, dropping increment");
                self.service
                    .cache
                    .increment_or(&self.keys.errors, 1, 1)
                    .await;
                growth::request_growth(
                    self.service.cache.as_ref(),
                    self.service.scheduler.as_ref(),
                    &self.name,
                    &self.keys,
                    self.service.config.debounce,
                )
                .await;
                IncrementOutcome::Conflict
            }
            Err(error) => {
                warn!(counter = %self.name, shard = index, %error, "increment abandoned");
                IncrementOutcome::Dropped
            }
        }
    }

    /// Commits `count + 1` to shard `index`, creating the record on first
    /// touch.
    async fn write_shard(&self, index: u32) -> Result<()> {
        let store = self.service.store.as_ref();
        let (record, expect) = match store.load_shard(&self.name, index).await? {
            Some(existing) => (
                ShardRecord {
                    counter: self.name.clone(),
                    index,
                    count: existing.value.count + 1,
                },
                Precondition::Version(existing.version),
            ),
            None => (
                ShardRecord {
                    counter: self.name.clone(),
                    index,
                    count: 1,
                },
                Precondition::Absent,
            ),
        };
        store.store_shard(&record, expect).await?;
        Ok(())
    }

    /// Returns the counter's shard count.
    ///
    /// Served from the cache when fresh; otherwise read from the counter
    /// record and re-cached.
    pub async fn shard_count(&self) -> Result<u32> {
        if let Some(cached) = self.service.cache.get(&self.keys.shards).await {
            if let Some(count) = u32::try_from(cached).ok().filter(|count| *count >= 1) {
                return Ok(count);
            }
        }

        let record = self
            .service
            .store
            .load_counter(&self.name)
            .await?
            .ok_or_else(|| Error::NotFound(self.name.clone()))?;
        self.service
            .cache
            .put(
                &self.keys.shards,
                i64::from(record.value.shard_count),
                self.service.config.shards_ttl,
            )
            .await;
        Ok(record.value.shard_count)
    }

    /// Returns the counter's aggregate value.
    ///
    /// Served from the cache when fresh; otherwise computed by summing every
    /// shard record and re-cached. A counter with no shard records yet sums
    /// to zero.
    pub async fn count(&self) -> Result<u64> {
        if let Some(cached) = self.service.cache.get(&self.keys.count).await {
            return Ok(cached.max(0) as u64);
        }

        let shards = self.service.store.scan_shards(&self.name).await?;
        let total: u64 = shards.iter().map(|shard| shard.count).sum();
        self.service
            .cache
            .put(&self.keys.count, total as i64, self.service.config.count_ttl)
            .await;
        Ok(total)
    }

    /// Grows the counter by `delta` shards, returning the new shard count.
    ///
    /// Shard growth is monotonic and one-directional; there is no shrink.
    /// The cached shard count is bumped opportunistically by the same delta
    /// when present (approximate until the next cold read, by the same
    /// token as every other cache entry here).
    pub async fn add_shards(&self, delta: u32) -> Result<u32> {
        if delta == 0 {
            return self.shard_count().await;
        }
        apply_shard_growth(
            self.service.store.as_ref(),
            self.service.cache.as_ref(),
            &self.keys,
            &self.name,
            delta,
        )
        .await
    }

    /// Captures the counter's name, shard count, and aggregate value.
    pub async fn snapshot(&self) -> Result<CounterSnapshot> {
        Ok(CounterSnapshot {
            name: self.name.clone(),
            shard_count: self.shard_count().await?,
            count: self.count().await?,
        })
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Shared growth implementation for [`Counter::add_shards`] and the growth
/// worker: one optimistic read-modify-write of the counter record, then a
/// best-effort bump of the cached shard count.
pub(crate) async fn apply_shard_growth(
    store: &dyn TransactionalStore,
    cache: &dyn Cache,
    keys: &CacheKeys,
    name: &str,
    delta: u32,
) -> Result<u32> {
    let current = store
        .load_counter(name)
        .await?
        .ok_or_else(|| Error::NotFound(name.to_string()))?;

    let record = CounterRecord {
        name: name.to_string(),
        shard_count: current.value.shard_count + delta,
    };
    store
        .store_counter(&record, Precondition::Version(current.version))
        .await?;

    cache.increment(&keys.shards, i64::from(delta)).await;
    debug!(counter = name, delta, shard_count = record.shard_count, "grew counter");
    Ok(record.shard_count)
}
