//! # Woxl Moderation
//!
//! The moderation engine behind the bot's commands.
//!
//! - [`duration`] parses expiry tokens and renders remaining time
//! - [`roles`] holds the authorization guard and role management
//! - [`target`] and [`args`] turn command text into a subject, expiry and reason
//! - [`actions`] issues and revokes warnings, mutes and bans, and kicks
//! - [`pagination`] slices list views and encodes page tokens
//! - [`display`] renders user references
//!
//! All platform access goes through the [`platform::ChatPlatform`] trait.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod args;
pub mod display;
pub mod duration;
pub mod error;
pub mod pagination;
pub mod platform;
pub mod presence;
pub mod roles;
pub mod target;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use actions::{
    platform_until, ActionPolicy, EffectOutcome, GrantOutcome, GrantRequest, KickOutcome,
    ModerationService, RevokeOutcome, KICK_MIN, MIN_PLATFORM_RESTRICTION,
};
pub use args::{parse_grant_args, GrantArgs};
pub use display::{display_name, display_ref};
pub use duration::{parse_duration, Remaining, TimeOffset, UnitLabels};
pub use error::{ModerationError, ModerationResult};
pub use pagination::{navigation_keyboard, paginate, Page, PageToken, PageTokenError, DEFAULT_PAGE_SIZE};
pub use platform::{
    ChatMember, ChatPlatform, IncomingCallback, IncomingMessage, InlineButton, InlineKeyboard,
    MemberPermissions, MemberStatus, PlatformError, PlatformResult, UserProfile,
};
pub use presence::{is_present, Presence};
pub use roles::{Access, Authorized, RoleGuard, RoleManager, RoleOutcome, ROLE_MANAGEMENT_MIN};
pub use target::{numeric_id, resolve, Target};
