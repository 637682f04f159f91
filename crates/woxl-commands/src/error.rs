//! Command handler errors

use thiserror::Error;
use woxl_common::WoxlError;
use woxl_moderation::{ModerationError, PlatformError};
use woxl_storage::StorageError;

/// Failures that end a handler early.
///
/// The dispatcher logs these and answers with a generic error reply.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Moderation engine failure
    #[error(transparent)]
    Moderation(#[from] ModerationError),

    /// Direct store access failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Sending a reply failed
    #[error("platform call failed: {0}")]
    Platform(#[from] PlatformError),
}

/// Result alias for handlers
pub type CommandResult<T> = Result<T, CommandError>;

impl From<CommandError> for WoxlError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Moderation(inner) => inner.into(),
            CommandError::Storage(inner) => inner.into(),
            CommandError::Platform(PlatformError::Api { code, description }) => {
                Self::telegram(description, Some(code))
            }
            CommandError::Platform(other) => Self::telegram(other.to_string(), None),
        }
    }
}
