//! Deferred task scheduling abstraction.
//!
//! Shard growth runs out-of-band: the write path only *requests* growth by
//! enqueuing a [`GrowthTask`] with a delay, and a worker consumes the task
//! later on its own execution context. The message carries nothing but the
//! counter name, which decouples the scheduling mechanism from the growth
//! logic and lets the payload travel through any queue that can move bytes.
//!
//! The scheduler itself performs no deduplication. Callers that need
//! at-most-one-task semantics guard enqueues externally; the counter
//! subsystem does so with a TTL-bounded cache marker (see
//! [`growth`](crate::counter::growth)).

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Serializable message requesting that a counter be enlarged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthTask {
    /// Name of the counter to grow.
    pub counter: String,
}

impl GrowthTask {
    /// Creates a growth request for the named counter.
    pub fn new(counter: impl Into<String>) -> Self {
        Self {
            counter: counter.into(),
        }
    }
}

/// Opaque identifier of an enqueued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle(pub u64);

/// Enqueues deferred work. No dedup, no cancellation.
#[async_trait]
pub trait TaskScheduler: Send + Sync {
    /// Schedules `task` to be consumed after `delay`.
    async fn enqueue(&self, task: GrowthTask, delay: Duration) -> Result<TaskHandle>;
}

/// Consumes scheduled tasks when their delay elapses.
///
/// Consumers must tolerate duplicate and stale deliveries: the external
/// dedup guard is soft state, and the counter a task refers to may have
/// been deleted between scheduling and execution.
#[async_trait]
pub trait TaskConsumer: Send + Sync {
    /// Runs one task to completion. Failures are the consumer's to log;
    /// the queue does not retry.
    async fn run(&self, task: GrowthTask);
}
