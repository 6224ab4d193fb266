//! Unified error type for counter operations.
//!
//! All fallible operations in this crate return [`Result`]. The variants are
//! deliberately coarse but distinguishable: callers branch on *not found*
//! versus *write conflict* versus *transient infrastructure failure*, and
//! nothing else. A write conflict in particular is an expected outcome of
//! optimistic concurrency, not an exceptional condition; the write path
//! treats it as a contention signal rather than a failure to surface.

use thiserror::Error;

/// Unified error type for store and counter operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No counter record exists under the given name.
    #[error("counter not found: {0}")]
    NotFound(String),

    /// An optimistic write lost the race: the record changed (or appeared)
    /// between read and write.
    #[error("write conflict")]
    Conflict,

    /// The backing store could not serve the request. Transient; the
    /// operation is abandoned, never retried automatically.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The task scheduler rejected or failed to accept a deferred task.
    #[error("scheduler error: {0}")]
    Scheduler(String),
}

impl Error {
    /// Returns `true` if this is a write conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict)
    }

    /// Returns `true` if this is a missing-record error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Result type for counter operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Error::Conflict.is_conflict());
        assert!(!Error::Conflict.is_not_found());
        assert!(Error::NotFound("pages".into()).is_not_found());
        assert!(!Error::Unavailable("down".into()).is_conflict());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::NotFound("pages".into()).to_string(),
            "counter not found: pages"
        );
        assert_eq!(Error::Conflict.to_string(), "write conflict");
    }
}
