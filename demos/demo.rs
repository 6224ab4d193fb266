//! End-to-end demo against the in-memory store, cache, and scheduler.
//!
//! Run with:
//! ```bash
//! cargo run --example demo
//! ```
//!
//! Starts a counter with a single shard, hammers it from several tasks so
//! that optimistic writes conflict, and waits for the growth machinery to
//! widen the counter. Watch the `frammenti` log lines for dropped
//! increments and the scheduled growth task.

use std::sync::Arc;
use std::time::Duration;

use frammenti::cache::memory::MemoryCache;
use frammenti::counter::growth::GrowthWorker;
use frammenti::counter::{Counters, IncrementOutcome};
use frammenti::queue::memory::MemoryScheduler;
use frammenti::store::memory::MemoryStore;

#[tokio::main]
async fn main() -> frammenti::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryCache::new());
    let worker = Arc::new(GrowthWorker::new(store.clone(), cache.clone()));
    let scheduler = Arc::new(MemoryScheduler::new(worker));
    let counters = Counters::new(store, cache, scheduler);

    let pages = counters.get_or_create("pages-created", 1).await?;
    println!(
        "created counter {:?} with {} shard(s)",
        pages.name(),
        pages.shard_count().await?
    );

    // Concurrent writers against one shard: expect some dropped increments.
    let mut handles = Vec::new();
    for task in 0..8 {
        let counter = pages.clone();
        handles.push(tokio::spawn(async move {
            let mut applied = 0u64;
            let mut dropped = 0u64;
            for _ in 0..200 {
                match counter.increment().await {
                    IncrementOutcome::Applied => applied += 1,
                    _ => dropped += 1,
                }
            }
            (task, applied, dropped)
        }));
    }
    for handle in handles {
        let (task, applied, dropped) = handle.await.expect("writer task panicked");
        println!("writer {task}: applied {applied}, dropped {dropped}");
    }

    // Give the debounced growth task time to fire, then read back.
    tokio::time::sleep(Duration::from_secs(6)).await;

    let snapshot = pages.snapshot().await?;
    println!(
        "final state: name={} shards={} count={}",
        snapshot.name, snapshot.shard_count, snapshot.count
    );
    Ok(())
}
