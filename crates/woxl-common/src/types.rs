//! Common type definitions and newtype wrappers for domain modeling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Telegram chat ID. Supergroups use negative identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Telegram user ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message ID, unique within its chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-chat staff role.
///
/// Roles are totally ordered by their level; a user without an assignment
/// has level 0 and is represented as `None` wherever an `Option<Role>` is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    /// Level 1.
    JuniorModerator = 1,
    /// Level 2.
    Moderator = 2,
    /// Level 3.
    SeniorModerator = 3,
    /// Level 4.
    Administrator = 4,
    /// Level 5, the chat owner.
    Owner = 5,
}

impl Role {
    /// All roles, highest first.
    pub const ALL_DESCENDING: [Self; 5] = [
        Self::Owner,
        Self::Administrator,
        Self::SeniorModerator,
        Self::Moderator,
        Self::JuniorModerator,
    ];

    /// Numeric level of this role (1..=5).
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Build a role from its numeric level.
    #[must_use]
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::JuniorModerator),
            2 => Some(Self::Moderator),
            3 => Some(Self::SeniorModerator),
            4 => Some(Self::Administrator),
            5 => Some(Self::Owner),
            _ => None,
        }
    }

    /// The next role up, or `None` at Owner.
    #[must_use]
    pub const fn promoted(self) -> Option<Self> {
        Self::from_level(self.level() + 1)
    }

    /// The next role down, or `None` at Junior Moderator.
    #[must_use]
    pub const fn demoted(self) -> Option<Self> {
        Self::from_level(self.level() - 1)
    }

    /// Localisation key of the role's display name.
    #[must_use]
    pub const fn message_key(self) -> &'static str {
        match self {
            Self::JuniorModerator => "role-junior-moderator",
            Self::Moderator => "role-moderator",
            Self::SeniorModerator => "role-senior-moderator",
            Self::Administrator => "role-administrator",
            Self::Owner => "role-owner",
        }
    }

    /// Parse a role name or level as typed by a chat member.
    #[must_use]
    pub fn parse_name(input: &str) -> Option<Self> {
        let name = input.trim().to_lowercase();
        if let Ok(level) = name.parse::<u8>() {
            return Self::from_level(level);
        }
        match name.as_str() {
            "владелец" | "owner" | "create" => Some(Self::Owner),
            "администратор" | "админ" | "admin" => Some(Self::Administrator),
            "ст.модератор" | "старший" | "senior" | "мл.администратор" | "младмин" | "мл.админ" => {
                Some(Self::SeniorModerator)
            }
            "модератор" | "модер" | "mod" => Some(Self::Moderator),
            "мл.модератор" | "мл.модер" | "хелпер" | "helper" => Some(Self::JuniorModerator),
            _ => None,
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.level()
    }
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::from_level(level).ok_or_else(|| format!("invalid role level {level}"))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Level of an optional role, 0 when absent.
#[must_use]
pub fn role_level(role: Option<Role>) -> u8 {
    role.map_or(0, Role::level)
}

/// Kind of a persisted punitive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Warning, a record only.
    Warn,
    /// Mute, mirrored as a chat restriction.
    Mute,
    /// Ban, mirrored as a platform ban.
    Ban,
}

impl ActionKind {
    /// All action kinds.
    pub const ALL: [Self; 3] = [Self::Warn, Self::Mute, Self::Ban];

    /// Identifier used in list page tokens (`warns`, `mutes`, `bans`).
    #[must_use]
    pub const fn list_kind(self) -> &'static str {
        match self {
            Self::Warn => "warns",
            Self::Mute => "mutes",
            Self::Ban => "bans",
        }
    }

    /// Inverse of [`ActionKind::list_kind`].
    #[must_use]
    pub fn from_list_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.list_kind() == kind)
    }

    /// Singular lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Mute => "mute",
            Self::Ban => "ban",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
