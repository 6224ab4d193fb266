//! Cache key derivation.
//!
//! Every counter owns four cache entries, distinguished by prefix: the
//! aggregate count, the shard count, the consecutive-conflict tally, and the
//! pending-growth-task marker. A handle derives all four once at
//! construction so the hot paths never format keys.

/// Prefix of the cached aggregate count.
pub(crate) const COUNT_PREFIX: &str = "Count:";
/// Prefix of the cached shard count.
pub(crate) const SHARDS_PREFIX: &str = "Shards:";
/// Prefix of the write-conflict tally.
pub(crate) const ERRORS_PREFIX: &str = "Errors:";
/// Prefix of the pending growth-task marker.
pub(crate) const TASK_PREFIX: &str = "GrowTask:";

/// The cache keys belonging to one named counter.
#[derive(Debug, Clone)]
pub(crate) struct CacheKeys {
    pub count: String,
    pub shards: String,
    pub errors: String,
    pub task: String,
}

impl CacheKeys {
    pub fn new(name: &str) -> Self {
        Self {
            count: format!("{COUNT_PREFIX}{name}"),
            shards: format!("{SHARDS_PREFIX}{name}"),
            errors: format!("{ERRORS_PREFIX}{name}"),
            task: format!("{TASK_PREFIX}{name}"),
        }
    }
}
