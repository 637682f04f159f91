//! Punitive action service: warn, mute, ban and kick
//!
//! Each operation checks the caller's [`Authorized`] level against the
//! action's policy, persists the state transition, and then mirrors it on
//! the platform. The platform effect is reported separately and never turns
//! a persisted transition into a failure.

use crate::duration::TimeOffset;
use crate::error::ModerationResult;
use crate::platform::{ChatPlatform, MemberPermissions, PlatformError};
use crate::presence::is_present;
use crate::roles::Authorized;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use woxl_common::{ActionKind, ChatId, Role, UserId};
use woxl_storage::{Database, NewAction, PunitiveRecord};

/// Thresholds of one action kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPolicy {
    /// Minimum role to issue
    pub grant_min: Role,
    /// Minimum role to revoke
    pub revoke_min: Role,
    /// Whether the target must be in the chat to be punished
    pub requires_presence: bool,
}

impl ActionPolicy {
    /// Policy of a record-backed action
    #[must_use]
    pub const fn of(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Warn => Self {
                grant_min: Role::JuniorModerator,
                revoke_min: Role::JuniorModerator,
                requires_presence: false,
            },
            ActionKind::Mute => Self {
                grant_min: Role::Moderator,
                revoke_min: Role::Moderator,
                requires_presence: true,
            },
            ActionKind::Ban => Self {
                grant_min: Role::SeniorModerator,
                revoke_min: Role::SeniorModerator,
                requires_presence: true,
            },
        }
    }
}

/// Minimum role to kick
pub const KICK_MIN: Role = Role::Owner;

/// Shortest restriction sent to the platform.
///
/// The Bot API reads an `until_date` less than 30 seconds ahead of its own
/// clock as permanent.
pub const MIN_PLATFORM_RESTRICTION: TimeDelta = TimeDelta::seconds(40);

/// Platform-side expiry for a stored `until`, never closer than
/// [`MIN_PLATFORM_RESTRICTION`] to `now`
#[must_use]
pub fn platform_until(until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    until.map(|until| until.max(now + MIN_PLATFORM_RESTRICTION))
}

/// Outcome of mirroring a transition on the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    /// The platform accepted the call
    Applied,
    /// The call failed; the persisted state stands
    Failed(String),
}

impl EffectOutcome {
    fn from_result(result: Result<(), PlatformError>, what: &str, chat: ChatId, user: UserId) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(e) => {
                warn!(%chat, %user, error = %e, "Platform {what} failed");
                Self::Failed(e.to_string())
            }
        }
    }
}

/// A grant request after target and argument resolution
#[derive(Debug, Clone)]
pub struct GrantRequest {
    /// Which action
    pub kind: ActionKind,
    /// Target user
    pub target: UserId,
    /// Expiry offset from `now`
    pub duration: Option<TimeOffset>,
    /// Free-text reason
    pub reason: Option<String>,
    /// Command processing time
    pub now: DateTime<Utc>,
}

/// Result of a grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// Caller's role is below the threshold
    Denied,
    /// Target is not in the chat
    NotPresent,
    /// The expiry falls outside the representable range; nothing stored
    ExpiryOutOfRange,
    /// Record created
    Granted {
        /// The new record
        record: PunitiveRecord,
        /// Platform mirror, `None` for warnings
        effect: Option<EffectOutcome>,
    },
}

/// Result of a revocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// Caller's role is below the threshold
    Denied,
    /// The target has no active record of this kind
    NothingActive,
    /// Newest active record revoked
    Revoked {
        /// The revoked record
        record: PunitiveRecord,
        /// Platform mirror, `None` for warnings
        effect: Option<EffectOutcome>,
    },
}

/// Result of a kick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KickOutcome {
    /// Caller is not an owner
    Denied,
    /// Target is not in the chat
    NotPresent,
    /// Ban followed by unban was attempted
    Kicked {
        /// Platform result
        effect: EffectOutcome,
    },
}

/// Issues, revokes and lists punitive actions
#[derive(Clone)]
pub struct ModerationService {
    db: Database,
    platform: Arc<dyn ChatPlatform>,
}

impl std::fmt::Debug for ModerationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationService").finish_non_exhaustive()
    }
}

impl ModerationService {
    /// Create a service over a store and platform
    pub fn new(db: Database, platform: Arc<dyn ChatPlatform>) -> Self {
        Self { db, platform }
    }

    /// Issue a warning, mute or ban
    pub async fn grant(&self, auth: &Authorized, request: GrantRequest) -> ModerationResult<GrantOutcome> {
        let chat = auth.chat();
        let policy = ActionPolicy::of(request.kind);
        if !auth.covers(policy.grant_min) {
            return Ok(GrantOutcome::Denied);
        }

        let until = match request.duration {
            None => None,
            Some(duration) => match duration.apply(request.now) {
                Some(until) => Some(until),
                None => {
                    info!(kind = %request.kind, %chat, ?duration, "Expiry out of range, grant rejected");
                    return Ok(GrantOutcome::ExpiryOutOfRange);
                }
            },
        };

        if policy.requires_presence
            && !is_present(self.platform.as_ref(), chat, request.target).await.present
        {
            info!(kind = %request.kind, %chat, target = %request.target, "Target not present, grant rejected");
            return Ok(GrantOutcome::NotPresent);
        }
        let record = self
            .db
            .create_action(NewAction {
                kind: request.kind,
                chat_id: chat,
                user_id: request.target,
                issued_by: Some(auth.caller()),
                reason: request.reason,
                until,
                created_at: request.now,
            })
            .await?;

        let enforced_until = platform_until(until, request.now);
        let effect = match request.kind {
            ActionKind::Warn => None,
            ActionKind::Mute => Some(EffectOutcome::from_result(
                self.platform
                    .restrict_member(chat, request.target, MemberPermissions::muted(), enforced_until)
                    .await,
                "restrict",
                chat,
                request.target,
            )),
            ActionKind::Ban => Some(EffectOutcome::from_result(
                self.platform.ban_member(chat, request.target, enforced_until).await,
                "ban",
                chat,
                request.target,
            )),
        };

        Ok(GrantOutcome::Granted { record, effect })
    }

    /// Revoke the target's newest active record of `kind`
    pub async fn revoke(
        &self,
        auth: &Authorized,
        kind: ActionKind,
        target: UserId,
        now: DateTime<Utc>,
    ) -> ModerationResult<RevokeOutcome> {
        let chat = auth.chat();
        if !auth.covers(ActionPolicy::of(kind).revoke_min) {
            return Ok(RevokeOutcome::Denied);
        }

        let Some(record) = self
            .db
            .revoke_latest(kind, chat, target, Some(auth.caller()), now)
            .await?
        else {
            return Ok(RevokeOutcome::NothingActive);
        };

        let effect = match kind {
            ActionKind::Warn => None,
            ActionKind::Mute => Some(EffectOutcome::from_result(
                self.platform
                    .restrict_member(chat, target, MemberPermissions::full(), None)
                    .await,
                "unrestrict",
                chat,
                target,
            )),
            ActionKind::Ban => Some(EffectOutcome::from_result(
                self.platform.unban_member(chat, target, true).await,
                "unban",
                chat,
                target,
            )),
        };

        Ok(RevokeOutcome::Revoked { record, effect })
    }

    /// Remove the target from the chat without keeping a record
    pub async fn kick(&self, auth: &Authorized, target: UserId) -> KickOutcome {
        let chat = auth.chat();
        if !auth.covers(KICK_MIN) {
            return KickOutcome::Denied;
        }
        if !is_present(self.platform.as_ref(), chat, target).await.present {
            return KickOutcome::NotPresent;
        }

        let result = match self.platform.ban_member(chat, target, None).await {
            Ok(()) => self.platform.unban_member(chat, target, true).await,
            Err(e) => Err(e),
        };
        let effect = EffectOutcome::from_result(result, "kick", chat, target);
        if effect == EffectOutcome::Applied {
            info!(%chat, %target, by = %auth.caller(), "User kicked");
        }
        KickOutcome::Kicked { effect }
    }

    /// Active records, newest first, optionally scoped to one user.
    ///
    /// Always read fresh from the store.
    pub fn active(
        &self,
        kind: ActionKind,
        chat: ChatId,
        target: Option<UserId>,
    ) -> ModerationResult<Vec<PunitiveRecord>> {
        Ok(self.db.list_active(kind, chat, target)?)
    }
}
