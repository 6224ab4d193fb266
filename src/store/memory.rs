//! In-memory [`TransactionalStore`] for tests, benches, and demos.
//!
//! Versions are per-record monotonic integers; preconditions are checked
//! under a single mutex, which gives the same observable semantics as a
//! serializable store without modeling transactions explicitly.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::store::{CounterRecord, Precondition, ShardRecord, TransactionalStore, Versioned};

#[derive(Default)]
struct State {
    counters: HashMap<String, Versioned<CounterRecord>>,
    // BTreeMap keyed by (counter, index) so scan_shards is a range scan.
    shards: BTreeMap<(String, u32), Versioned<ShardRecord>>,
}

/// A process-local store with optimistic-concurrency semantics.
///
/// Not intended for production use; it exists so the counter subsystem can be
/// exercised end-to-end without a real database.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn check(expect: Precondition, current: Option<u64>) -> Result<u64> {
        match (expect, current) {
            (Precondition::Absent, None) => Ok(1),
            (Precondition::Version(v), Some(cur)) if v == cur => Ok(cur + 1),
            _ => Err(Error::Conflict),
        }
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    async fn load_counter(&self, name: &str) -> Result<Option<Versioned<CounterRecord>>> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.counters.get(name).cloned())
    }

    async fn store_counter(&self, record: &CounterRecord, expect: Precondition) -> Result<u64> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let current = state.counters.get(&record.name).map(|v| v.version);
        let version = Self::check(expect, current)?;
        state.counters.insert(
            record.name.clone(),
            Versioned {
                value: record.clone(),
                version,
            },
        );
        Ok(version)
    }

    async fn load_shard(
        &self,
        counter: &str,
        index: u32,
    ) -> Result<Option<Versioned<ShardRecord>>> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.shards.get(&(counter.to_string(), index)).cloned())
    }

    async fn store_shard(&self, record: &ShardRecord, expect: Precondition) -> Result<u64> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let key = (record.counter.clone(), record.index);
        let current = state.shards.get(&key).map(|v| v.version);
        let version = Self::check(expect, current)?;
        state.shards.insert(
            key,
            Versioned {
                value: record.clone(),
                version,
            },
        );
        Ok(version)
    }

    async fn scan_shards(&self, counter: &str) -> Result<Vec<ShardRecord>> {
        let state = self.state.lock().expect("store mutex poisoned");
        let range = (counter.to_string(), 0)..=(counter.to_string(), u32::MAX);
        Ok(state
            .shards
            .range(range)
            .map(|(_, v)| v.value.clone())
            .collect())
    }
}
