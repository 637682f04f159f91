//! Storage error types

use thiserror::Error;
use woxl_common::WoxlError;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by the sled-backed store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),

    /// A stored value could not be encoded or decoded
    #[error("Failed to (de)serialize stored record: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StorageError> for WoxlError {
    fn from(err: StorageError) -> Self {
        Self::storage_with_source("storage operation failed", err)
    }
}
