//! # Woxl Bot
//!
//! Binary crate of the Woxl moderation bot: the Telegram Bot API client,
//! the long-polling loop and process bootstrap.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod bot;
pub mod error;
pub mod telegram;

pub use bot::WoxlBot;
pub use error::{BotError, BotResult};
pub use telegram::TelegramClient;
