//! Serializable point-in-time counter state.
//!
//! A [`CounterSnapshot`] captures everything an external observer usually
//! wants in one struct: the counter's name, how many shards it currently
//! spans, and the aggregate value at capture time. Like every read in this
//! crate, the captured values are an eventual aggregate: they may lag
//! concurrent increments by up to the cache TTL.
//!
//! # Examples
//!
//! ```rust
//! use frammenti::snapshot::CounterSnapshot;
//!
//! let snapshot = CounterSnapshot {
//!     name: "pages-created".to_string(),
//!     shard_count: 3,
//!     count: 42,
//! };
//!
//! let json = serde_json::to_string(&snapshot).unwrap();
//! assert_eq!(json, r#"{"name":"pages-created","shard_count":3,"count":42}"#);
//! ```

use serde::{Deserialize, Serialize};

/// A snapshot of a single counter's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// The counter's name.
    pub name: String,
    /// Shard count at capture time.
    pub shard_count: u32,
    /// Aggregate value at capture time.
    pub count: u64,
}
