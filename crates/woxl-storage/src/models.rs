//! Persisted record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use woxl_common::{ActionKind, ChatId, Role, UserId};

/// A chat the bot has interacted with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Platform chat id
    pub id: ChatId,
    /// First interaction
    pub registered_at: DateTime<Utc>,
}

/// The single role held by a user in a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Chat the role applies to
    pub chat_id: ChatId,
    /// Role holder
    pub user_id: UserId,
    /// Assigned role
    pub role: Role,
    /// Who assigned it, `None` for automatic owner detection
    pub assigned_by: Option<UserId>,
    /// Time of the last write
    pub assigned_at: DateTime<Utc>,
    /// Optional note
    pub reason: Option<String>,
}

/// Display name override of a user in a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nick {
    /// Chat the nickname applies to
    pub chat_id: ChatId,
    /// Nickname owner
    pub user_id: UserId,
    /// Non-empty display name
    pub nick: String,
    /// Time of the last write
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a punitive record. Only `Active -> Revoked` exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecordState {
    /// In force until revoked
    Active,
    /// Revoked by a command
    Revoked {
        /// Revocation time
        revoked_at: DateTime<Utc>,
        /// Revoking user
        revoked_by: Option<UserId>,
    },
}

/// A warning, mute or ban
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunitiveRecord {
    /// Store-wide monotonic id
    pub id: u64,
    /// Which record set this belongs to
    pub kind: ActionKind,
    /// Chat of the action
    pub chat_id: ChatId,
    /// Punished user
    pub user_id: UserId,
    /// Issuer, `None` for the system
    pub issued_by: Option<UserId>,
    /// Free-text reason
    pub reason: Option<String>,
    /// Expiry, `None` for indefinite
    pub until: Option<DateTime<Utc>>,
    /// Lifecycle state
    pub state: RecordState,
    /// Canonical ordering key, newest first
    pub created_at: DateTime<Utc>,
}

impl PunitiveRecord {
    /// Whether the record is still in force
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, RecordState::Active)
    }

    /// Transition to `Revoked`. Returns `false` if already revoked.
    pub fn revoke(&mut self, at: DateTime<Utc>, by: Option<UserId>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = RecordState::Revoked {
            revoked_at: at,
            revoked_by: by,
        };
        true
    }
}

/// Input for creating a punitive record
#[derive(Debug, Clone)]
pub struct NewAction {
    /// Record set
    pub kind: ActionKind,
    /// Chat of the action
    pub chat_id: ChatId,
    /// Punished user
    pub user_id: UserId,
    /// Issuer
    pub issued_by: Option<UserId>,
    /// Reason
    pub reason: Option<String>,
    /// Expiry
    pub until: Option<DateTime<Utc>>,
    /// Processing time of the command
    pub created_at: DateTime<Utc>,
}
