//! # Woxl Commands
//!
//! Chat command handling for the Woxl moderation bot.
//!
//! Incoming text is matched against a trigger table in [`triggers`] and
//! routed by the [`dispatch::Dispatcher`] to a handler that renders the
//! localised reply. Moderation decisions themselves live in
//! `woxl-moderation`; the handlers here only parse, authorize and reply.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod context;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod greeting;
pub mod lists;
pub mod membership;
pub mod new_year;
pub mod nicks;
pub mod raven;
pub mod reply;
pub mod roles;
pub mod triggers;

pub use context::CommandContext;
pub use dispatch::Dispatcher;
pub use error::{CommandError, CommandResult};
pub use membership::MembershipChange;
pub use triggers::{match_command, Command, CommandText, Matched};
