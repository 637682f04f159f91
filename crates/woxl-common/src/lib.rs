//! # Woxl Common
//!
//! Shared types, errors, logging and utilities for the Woxl moderation bot.
//!
//! Every other crate in the workspace depends on this one for the chat and
//! user identifiers, the role hierarchy and the punitive action kinds.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{Result, WoxlError};
pub use types::*;
pub use utils::*;
