//! Storage adapter errors.

use std::time::Duration;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by a storage adapter.
///
/// Messages carry the dataset and the SQL text but never bound parameter
/// values, which may hold sensitive filter input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    /// The backend rejected or failed the query.
    #[error("query against dataset '{dataset}' failed: {message}")]
    QueryFailed {
        dataset: String,
        sql: String,
        message: String,
    },

    /// No connection became available within the acquisition timeout.
    #[error("connection pool exhausted after waiting {waited:?}")]
    PoolExhausted { waited: Duration },

    /// The adapter was shut down while the call was pending.
    #[error("storage call cancelled")]
    Cancelled,

    /// Result columns of unequal length, or rows of the wrong shape.
    #[error("malformed result: {0}")]
    MalformedResult(String),

    /// The adapter cannot evaluate this request.
    #[error("unsupported by {adapter} adapter: {message}")]
    Unsupported { adapter: String, message: String },
}

impl StorageError {
    /// Whether retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::PoolExhausted { .. })
    }
}
