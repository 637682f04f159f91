//! # Woxl Config
//!
//! Type-safe configuration management for the Woxl moderation bot.
//!
//! Configuration is read from a TOML file, overlaid with environment
//! variables, validated, and then published through a lock-free
//! [`ConfigCache`] that can be swapped at runtime.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use cache::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
