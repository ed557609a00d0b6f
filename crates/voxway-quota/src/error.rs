use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced by access control and the usage ledger.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The key is empty or does not carry the recognized prefix.
    #[error("malformed access key")]
    MalformedKey,

    /// The key is well-formed but not present in the store.
    #[error("unknown access key")]
    UnknownKey,

    /// The key exists but has been deactivated.
    #[error("access key is disabled")]
    KeyDisabled,

    /// The key's daily window is exhausted.
    #[error("daily quota exhausted, resets at {resets_at}")]
    QuotaExceeded {
        /// Next UTC midnight, when the window rolls over.
        resets_at: DateTime<Utc>,
    },

    /// Underlying database failure.
    #[error("usage store error: {0}")]
    Db(#[from] rusqlite::Error),

    /// The store holds a value the code no longer understands.
    #[error("corrupt usage store: {0}")]
    Corrupt(String),

    /// Could not obtain a pooled connection.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// The blocking task running the query panicked or was cancelled.
    #[error("usage task failed: {0}")]
    Task(String),
}
