//! # Woxl Storage
//!
//! Embedded persistence for the moderation bot, built on `sled`.
//!
//! Six record sets are kept in separate trees: chats, role assignments,
//! nicknames, and one tree each for warnings, mutes and bans. Punitive
//! records are never deleted; revocation is a state transition.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod database;
pub mod error;
mod keys;
pub mod models;

pub use database::{Database, RoleUpsert, StorageOptions};
pub use error::{StorageError, StorageResult};
pub use models::*;
