//! Contention-driven shard growth.
//!
//! Per counter, the machinery moves through `IDLE → SCHEDULED → RUNNING →
//! IDLE`:
//!
//! - **IDLE → SCHEDULED** happens on a write conflict.
//!   [`request_growth`] checks the cache for a pending-task marker; if none
//!   exists it enqueues a [`GrowthTask`] after the debounce delay and
//!   records the marker with a TTL equal to that delay. A burst of
//!   conflicts inside one window therefore collapses into a single task.
//!   The marker is soft state; losing it risks only a duplicate, harmless
//!   task.
//! - **SCHEDULED → RUNNING** happens when the scheduler delivers the task
//!   to [`GrowthWorker`], which reads the accumulated conflict tally
//!   (-1 when absent or expired).
//! - **RUNNING → IDLE**: the worker grows the counter by
//!   `tally > step ? tally / 2 : step` shards (step defaults to 2) and
//!   clears the tally. A counter that vanished in the meantime is logged
//!   and skipped; the task never fails the queue.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::config::CounterConfig;
use crate::counter::keys::CacheKeys;
use crate::counter::apply_shard_growth;
use crate::queue::{GrowthTask, TaskConsumer, TaskScheduler};
use crate::store::TransactionalStore;

/// Schedules a debounced growth task for `name` unless one is pending.
pub(crate) async fn request_growth(
    cache: &dyn Cache,
    scheduler: &dyn TaskScheduler,
    name: &str,
    keys: &CacheKeys,
    window: Duration,
) {
    if cache.get(&keys.task).await.is_some() {
        // A task is already scheduled for this window.
        return;
    }

    match scheduler.enqueue(GrowthTask::new(name), window).await {
        Ok(handle) => {
            cache.put(&keys.task, handle.0 as i64, Some(window)).await;
            debug!(counter = name, ?window, "scheduled growth task");
        }
        Err(error) => {
            warn!(counter = name, %error, "failed to schedule growth task");
        }
    }
}

/// Returns the number of shards to add for an observed conflict tally.
///
/// A tally at or below `step` grows by `step`; larger tallies grow by half
/// the tally (integer division). An absent tally is passed as -1 and takes
/// the `step` branch. The halving is a deliberately blunt heuristic: growth
/// scales with observed contention without doubling away capacity.
fn growth_delta(tally: i64, step: u32) -> u32 {
    if tally > i64::from(step) {
        u32::try_from(tally / 2).unwrap_or(u32::MAX)
    } else {
        step
    }
}

/// Consumes [`GrowthTask`]s and enlarges the counters they name.
///
/// The worker holds its own store and cache references: it runs on the
/// scheduler's execution context, concurrently with ongoing increments, and
/// reads the counter record fresh rather than assuming a stable shard
/// count.
pub struct GrowthWorker {
    store: Arc<dyn TransactionalStore>,
    cache: Arc<dyn Cache>,
    config: CounterConfig,
}

impl GrowthWorker {
    /// Creates a worker with the default configuration.
    pub fn new(store: Arc<dyn TransactionalStore>, cache: Arc<dyn Cache>) -> Self {
        Self {
            store,
            cache,
            config: CounterConfig::default(),
        }
    }

    /// Replaces the configuration, returning `self` for method chaining.
    pub fn with_config(mut self, config: CounterConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl TaskConsumer for GrowthWorker {
    async fn run(&self, task: GrowthTask) {
        let keys = CacheKeys::new(&task.counter);

        let tally = self.cache.get(&keys.errors).await.unwrap_or(-1);
        let delta = growth_delta(tally, self.config.growth_step);

        match apply_shard_growth(
            self.store.as_ref(),
            self.cache.as_ref(),
            &keys,
            &task.counter,
            delta,
        )
        .await
        {
            Ok(shard_count) => {
                debug!(counter = %task.counter, tally, delta, shard_count, "growth task applied");
            }
            Err(error) if error.is_not_found() => {
                warn!(counter = %task.counter, "growth task: counter missing, nothing to grow");
            }
            Err(error) => {
                warn!(counter = %task.counter, %error, "growth task abandoned");
            }
        }

        // Back to IDLE either way; the next conflict starts a fresh tally.
        self.cache.delete(&keys.errors).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cache::memory::MemoryCache;
    use crate::store::memory::MemoryStore;
    use crate::store::{CounterRecord, Precondition};

    fn fixtures() -> (Arc<MemoryStore>, Arc<MemoryCache>, GrowthWorker) {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let worker = GrowthWorker::new(store.clone(), cache.clone());
        (store, cache, worker)
    }

    async fn seed_counter(store: &MemoryStore, name: &str, shard_count: u32) {
        store
            .store_counter(
                &CounterRecord {
                    name: name.to_string(),
                    shard_count,
                },
                Precondition::Absent,
            )
            .await
            .unwrap();
    }

    #[test]
    fn test_growth_delta_formula() {
        // tally <= 2 takes the fixed step, above that half the tally.
        for (tally, expected) in [
            (-1, 2),
            (0, 2),
            (1, 2),
            (2, 2),
            (3, 1),
            (4, 2),
            (5, 2),
            (6, 3),
            (10, 5),
            (101, 50),
        ] {
            assert_eq!(growth_delta(tally, 2), expected, "tally {tally}");
        }
    }

    #[tokio::test]
    async fn test_worker_grows_by_half_the_tally() {
        let (store, cache, worker) = fixtures();
        seed_counter(&store, "pages", 1).await;
        cache.put("Errors:pages", 6, None).await;

        worker.run(GrowthTask::new("pages")).await;

        let record = store.load_counter("pages").await.unwrap().unwrap();
        assert_eq!(record.value.shard_count, 4); // 1 + 6/2
        assert_eq!(cache.get("Errors:pages").await, None);
    }

    #[tokio::test]
    async fn test_worker_uses_step_when_tally_missing() {
        let (store, _cache, worker) = fixtures();
        seed_counter(&store, "pages", 1).await;

        worker.run(GrowthTask::new("pages")).await;

        let record = store.load_counter("pages").await.unwrap().unwrap();
        assert_eq!(record.value.shard_count, 3); // 1 + step
    }

    #[tokio::test]
    async fn test_worker_uses_step_for_small_tallies() {
        let (store, cache, worker) = fixtures();
        seed_counter(&store, "pages", 2).await;
        cache.put("Errors:pages", 1, None).await;

        worker.run(GrowthTask::new("pages")).await;

        let record = store.load_counter("pages").await.unwrap().unwrap();
        assert_eq!(record.value.shard_count, 4);
    }

    #[tokio::test]
    async fn test_worker_missing_counter_is_a_noop() {
        let (store, cache, worker) = fixtures();
        cache.put("Errors:ghost", 9, None).await;

        worker.run(GrowthTask::new("ghost")).await;

        assert!(store.load_counter("ghost").await.unwrap().is_none());
        // The tally is still cleared; the state machine returns to idle.
        assert_eq!(cache.get("Errors:ghost").await, None);
    }

    #[tokio::test]
    async fn test_worker_refreshes_cached_shard_count() {
        let (store, cache, worker) = fixtures();
        seed_counter(&store, "pages", 1).await;
        cache.put("Shards:pages", 1, None).await;
        cache.put("Errors:pages", 8, None).await;

        worker.run(GrowthTask::new("pages")).await;

        assert_eq!(cache.get("Shards:pages").await, Some(5));
    }

    #[tokio::test]
    async fn test_request_growth_is_idempotent_within_a_window() {
        use std::sync::Mutex;
        use crate::error::Result;
        use crate::queue::TaskHandle;

        #[derive(Default)]
        struct Recorder(Mutex<u64>);

        #[async_trait]
        impl TaskScheduler for Recorder {
            async fn enqueue(&self, _task: GrowthTask, _delay: Duration) -> Result<TaskHandle> {
                let mut count = self.0.lock().unwrap();
                *count += 1;
                Ok(TaskHandle(*count))
            }
        }

        let cache = MemoryCache::new();
        let scheduler = Recorder::default();
        let keys = CacheKeys::new("pages");
        let window = Duration::from_secs(5);

        for _ in 0..4 {
            request_growth(&cache, &scheduler, "pages", &keys, window).await;
        }
        assert_eq!(*scheduler.0.lock().unwrap(), 1);
        assert!(cache.get(&keys.task).await.is_some());
    }
}
