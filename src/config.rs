//! Tunable parameters for the counter subsystem.

use std::time::Duration;

/// Configuration shared by the counter facade and the growth worker.
///
/// The defaults reproduce the behavior of the original deployment: a five
/// second debounce window and a growth step of two shards per cycle. All of
/// these are heuristics subject to tuning for a given store and workload.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use frammenti::config::CounterConfig;
///
/// let config = CounterConfig {
///     debounce: Duration::from_secs(10),
///     ..CounterConfig::default()
/// };
/// assert_eq!(config.growth_step, 2);
/// ```
#[derive(Debug, Clone)]
pub struct CounterConfig {
    /// Delay before a scheduled growth task runs, and the TTL of the cache
    /// marker that suppresses duplicate scheduling. Must exceed typical
    /// task-queue latency so a burst of conflicts collapses into one task.
    pub debounce: Duration,

    /// TTL for the cached aggregate count. `None` caches without expiry.
    pub count_ttl: Option<Duration>,

    /// TTL for the cached shard count. `None` caches without expiry.
    pub shards_ttl: Option<Duration>,

    /// Shards added per growth cycle while the observed error tally is at or
    /// below this value; larger tallies grow by `tally / 2` instead.
    pub growth_step: u32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(5),
            count_ttl: Some(Duration::from_secs(30)),
            shards_ttl: Some(Duration::from_secs(60)),
            growth_step: 2,
        }
    }
}
