//! # Frammenti - Adaptive Sharded Counters on a Transactional Store
//!
//! A Rust library implementing the **sharded counter pattern** over a
//! transactional key-value store: an approximately-consistent, named counter
//! that sustains high write throughput without funneling every increment
//! through a single contended record.
//!
//! ## The Problem
//!
//! In a store with optimistic concurrency, the naive counter is a single
//! record that every writer reads, bumps, and writes back. Correct, but a
//! scalability dead end: every pair of concurrent writers races on the same
//! record, one of them loses, and under load the conflict rate approaches
//! 100%. The hotter the counter, the less of it you can actually count.
//!
//! ## The Solution: Sharding plus Contention Feedback
//!
//! This library splits each counter into independent **shard records**, keyed
//! by `(counter name, shard index)`. Each increment picks one shard uniformly
//! at random and commits there, so two concurrent writers collide only with
//! probability `1/shard_count`. Reads sum all shards, which is more expensive,
//! but reads are the rare operation and a best-effort cache absorbs most of them.
//!
//! The shard count is not fixed. Write conflicts are tallied, and a debounced
//! background task grows the counter in proportion to the observed
//! contention, a self-tuning mechanism rather than a guessed partition
//! count:
//!
//! ```text
//!   increment() ──► pick shard i ∈ [0, S) ──► optimistic write
//!                                                │
//!                              conflict ◄────────┘ success ──► bump cached sum
//!                                 │
//!                                 ▼
//!                        tally error, debounce ──► GrowthTask (after delay)
//!                                                        │
//!                                                        ▼
//!                                            add_shards(f(tally)), S grows,
//!                                            future conflicts get rarer
//! ```
//!
//! ## Consistency Contract
//!
//! Deliberately relaxed, and documented rather than apologized for:
//!
//! - An increment that hits a conflict is **dropped**, not retried; the
//!   guarantee is "most increments land", and the conflict makes future
//!   drops less likely. Callers needing exactly-once retry whole operations.
//! - [`count()`](counter::Counter::count) is an **eventual aggregate**: up to
//!   one cache TTL stale, exact when the cache is cold.
//! - Shard growth is monotonic; nothing ever shrinks or is deleted.
//!
//! ## Architecture
//!
//! | Module | Role |
//! |--------|------|
//! | [`counter`] | Public facade: [`Counters`](counter::Counters) service and per-name [`Counter`](counter::Counter) handles |
//! | [`counter::growth`] | Debounced, contention-driven shard growth |
//! | [`counter::picker`] | Injectable shard selection (uniform random by default) |
//! | [`store`] | [`TransactionalStore`](store::TransactionalStore) trait + in-memory implementation |
//! | [`cache`] | Best-effort TTL [`Cache`](cache::Cache) trait + in-memory implementation |
//! | [`queue`] | Deferred [`TaskScheduler`](queue::TaskScheduler) trait + in-memory implementation |
//! | [`snapshot`] | Serializable point-in-time counter state |
//!
//! All three collaborators are injected trait objects; the bundled `memory`
//! implementations exist for tests, benches, and demos, and any real store,
//! cache, or task queue slots in behind the same traits.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use frammenti::cache::memory::MemoryCache;
//! use frammenti::counter::growth::GrowthWorker;
//! use frammenti::counter::Counters;
//! use frammenti::queue::memory::MemoryScheduler;
//! use frammenti::store::memory::MemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> frammenti::Result<()> {
//! let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
//! let cache = Arc::new(MemoryCache::new());
//!
//! // The growth worker consumes scheduled tasks out-of-band.
//! let worker = Arc::new(GrowthWorker::new(store.clone(), cache.clone()));
//! let scheduler = Arc::new(MemoryScheduler::new(worker));
//!
//! let counters = Counters::new(store, cache, scheduler);
//! let pages = counters.get_or_create("pages-created", 1).await?;
//!
//! pages.increment().await;
//! pages.increment().await;
//! assert_eq!(pages.count().await?, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## When to Use
//!
//! Use this pattern when a single counter takes frequent concurrent writes
//! against a store with optimistic concurrency, and a slightly stale read is
//! acceptable. For a counter updated by one writer, or one that must be read
//! exactly, a plain record is simpler and cheaper.

pub mod cache;
pub mod config;
pub mod counter;
pub mod error;
pub mod queue;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
