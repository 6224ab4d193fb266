//! In-memory [`TaskScheduler`] that drives a consumer on tokio timers.
//!
//! Each enqueue spawns a task that sleeps for the requested delay and then
//! hands the message to the consumer. Delivery order between tasks with
//! equal deadlines is unspecified, matching real task queues.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::queue::{GrowthTask, TaskConsumer, TaskHandle, TaskScheduler};

/// A scheduler that runs tasks on the current tokio runtime.
pub struct MemoryScheduler {
    consumer: Arc<dyn TaskConsumer>,
    next_handle: AtomicU64,
}

impl MemoryScheduler {
    /// Creates a scheduler delivering to `consumer`.
    pub fn new(consumer: Arc<dyn TaskConsumer>) -> Self {
        Self {
            consumer,
            next_handle: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl TaskScheduler for MemoryScheduler {
    async fn enqueue(&self, task: GrowthTask, delay: Duration) -> Result<TaskHandle> {
        let handle = TaskHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let consumer = Arc::clone(&self.consumer);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            consumer.run(task).await;
        });
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<GrowthTask>>,
    }

    #[async_trait]
    impl TaskConsumer for Recorder {
        async fn run(&self, task: GrowthTask) {
            self.seen.lock().unwrap().push(task);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_after_delay() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = MemoryScheduler::new(recorder.clone());

        scheduler
            .enqueue(GrowthTask::new("pages"), Duration::from_secs(5))
            .await
            .unwrap();
        tokio::task::yield_now().await;
        assert!(recorder.seen.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].counter, "pages");
    }

    #[tokio::test]
    async fn test_handles_are_distinct() {
        let scheduler = MemoryScheduler::new(Arc::new(Recorder::default()));
        let a = scheduler
            .enqueue(GrowthTask::new("a"), Duration::ZERO)
            .await
            .unwrap();
        let b = scheduler
            .enqueue(GrowthTask::new("b"), Duration::ZERO)
            .await
            .unwrap();
        assert_ne!(a, b);
    }
}
