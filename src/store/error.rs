// Storage errors

use thiserror::Error;

/// Error returned by a store operation
#[derive(Error, Debug)]
pub enum StoreError {
    /// A report with the same number already exists
    #[error("Duplicate report identifier: {0}")]
    DuplicateIdentifier(String),

    /// Other unique index violation (email, username, category name)
    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Storage backend failure: {0}")]
    Backend(String),

    #[error("Corrupted document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Backend(e.to_string())
    }
}
