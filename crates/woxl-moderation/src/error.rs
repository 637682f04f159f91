//! Error type for moderation operations

use thiserror::Error;
use woxl_common::WoxlError;
use woxl_storage::StorageError;

/// Failures that abort a moderation operation.
///
/// Authorization, precondition and not-found results are outcomes, not
/// errors; platform side-effect failures are reported inside the outcome.
#[derive(Error, Debug)]
pub enum ModerationError {
    /// Reading or writing the store failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result alias for moderation operations
pub type ModerationResult<T> = Result<T, ModerationError>;

impl From<ModerationError> for WoxlError {
    fn from(err: ModerationError) -> Self {
        match err {
            ModerationError::Storage(inner) => inner.into(),
        }
    }
}
