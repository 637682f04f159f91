//! Role hierarchy: the authorization guard and role management
//!
//! Every privileged operation goes through [`RoleGuard::authorize`], which
//! hands out an [`Authorized`] proof carrying the caller's level. Effectful
//! operations take that proof instead of re-reading the caller's role.

use crate::error::ModerationResult;
use crate::platform::{ChatPlatform, MemberStatus};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use woxl_common::{ChatId, Role, UserId};
use woxl_config::ConfigCache;
use woxl_storage::{Database, RoleUpsert};

/// Proof that a caller passed an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorized {
    chat: ChatId,
    caller: UserId,
    level: u8,
}

impl Authorized {
    /// Chat the check ran in
    #[must_use]
    pub const fn chat(&self) -> ChatId {
        self.chat
    }

    /// The authorized caller
    #[must_use]
    pub const fn caller(&self) -> UserId {
        self.caller
    }

    /// Caller's privilege level, 0 for no role
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Whether the caller's level reaches `min`
    #[must_use]
    pub const fn covers(&self, min: Role) -> bool {
        self.level >= min.level()
    }
}

/// Result of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The caller may proceed
    Granted(Authorized),
    /// The caller's level is below the threshold
    Denied {
        /// The caller's level
        level: u8,
    },
}

impl Access {
    /// The proof, if granted
    #[must_use]
    pub const fn granted(self) -> Option<Authorized> {
        match self {
            Self::Granted(auth) => Some(auth),
            Self::Denied { .. } => None,
        }
    }
}

/// Reads caller levels and gates privileged operations
#[derive(Clone)]
pub struct RoleGuard {
    db: Database,
    platform: Arc<dyn ChatPlatform>,
    config: Arc<ConfigCache>,
}

impl std::fmt::Debug for RoleGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleGuard").finish_non_exhaustive()
    }
}

impl RoleGuard {
    /// Create a guard.
    ///
    /// `moderation.platform_admin_fallback` is read from the live config on
    /// every check; when set, users without a stored role are ranked by their
    /// platform status instead of as level 0.
    pub fn new(db: Database, platform: Arc<dyn ChatPlatform>, config: Arc<ConfigCache>) -> Self {
        Self { db, platform, config }
    }

    /// Stored role of a user
    pub fn role(&self, chat: ChatId, user: UserId) -> ModerationResult<Option<Role>> {
        Ok(self.db.get_role(chat, user)?.map(|assignment| assignment.role))
    }

    /// Effective privilege level, 0 when the user has no role
    pub async fn level(&self, chat: ChatId, user: UserId) -> ModerationResult<u8> {
        if let Some(role) = self.role(chat, user)? {
            return Ok(role.level());
        }
        if !self.config.get().moderation.platform_admin_fallback {
            return Ok(0);
        }

        match self.platform.get_chat_member(chat, user).await {
            Ok(member) => Ok(match member.status {
                MemberStatus::Creator => Role::Owner.level(),
                MemberStatus::Administrator => Role::Administrator.level(),
                _ => 0,
            }),
            Err(e) => {
                warn!(%chat, %user, error = %e, "Platform status lookup failed, treating as no role");
                Ok(0)
            }
        }
    }

    /// Check that `caller` holds at least `min` in `chat`
    pub async fn authorize(&self, chat: ChatId, caller: UserId, min: Role) -> ModerationResult<Access> {
        let level = self.level(chat, caller).await?;
        if level >= min.level() {
            Ok(Access::Granted(Authorized { chat, caller, level }))
        } else {
            debug!(%chat, %caller, level, required = min.level(), "Authorization denied");
            Ok(Access::Denied { level })
        }
    }
}

/// Result of a role management request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleOutcome {
    /// Caller is not an owner
    Denied,
    /// Requested role is not below the caller's
    TooHigh,
    /// Target's current role is not below the caller's
    TargetOutranks,
    /// Caller tried to remove their own role
    SelfRemove,
    /// Caller tried to demote themselves
    SelfDemote,
    /// Target holds no role
    NoRole,
    /// Target already holds the highest role
    AtMax,
    /// Target already holds the lowest role
    AtMin,
    /// Role written
    Assigned {
        /// New role
        role: Role,
        /// Whether a previous role was overwritten
        upsert: RoleUpsert,
    },
    /// Role deleted
    Removed {
        /// Role before removal
        previous: Role,
    },
    /// Role raised by one level
    Promoted {
        /// New role
        role: Role,
    },
    /// Role lowered by one level
    Demoted {
        /// New role
        role: Role,
    },
}

/// Minimum level for managing roles
pub const ROLE_MANAGEMENT_MIN: Role = Role::Owner;

/// Role management operations
#[derive(Debug, Clone)]
pub struct RoleManager {
    guard: RoleGuard,
    db: Database,
}

impl RoleManager {
    /// Create a manager over the given guard and store
    #[must_use]
    pub const fn new(guard: RoleGuard, db: Database) -> Self {
        Self { guard, db }
    }

    /// The underlying guard
    #[must_use]
    pub const fn guard(&self) -> &RoleGuard {
        &self.guard
    }

    async fn owner(&self, chat: ChatId, caller: UserId) -> ModerationResult<Option<Authorized>> {
        Ok(self
            .guard
            .authorize(chat, caller, ROLE_MANAGEMENT_MIN)
            .await?
            .granted())
    }

    fn outranks(auth: &Authorized, current: Option<Role>) -> bool {
        current.is_some_and(|role| role.level() >= auth.level())
    }

    /// Give `target` exactly `role`
    pub async fn assign(
        &self,
        chat: ChatId,
        caller: UserId,
        target: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> ModerationResult<RoleOutcome> {
        let Some(auth) = self.owner(chat, caller).await? else {
            return Ok(RoleOutcome::Denied);
        };
        if role.level() >= auth.level() {
            return Ok(RoleOutcome::TooHigh);
        }
        if Self::outranks(&auth, self.guard.role(chat, target)?) {
            return Ok(RoleOutcome::TargetOutranks);
        }

        let upsert = self
            .db
            .set_role(chat, target, role, Some(caller), None, now)
            .await?;
        info!(%chat, %caller, %target, role = role.level(), "Role assigned");
        Ok(RoleOutcome::Assigned { role, upsert })
    }

    /// Delete `target`'s role
    pub async fn remove(&self, chat: ChatId, caller: UserId, target: UserId) -> ModerationResult<RoleOutcome> {
        let Some(auth) = self.owner(chat, caller).await? else {
            return Ok(RoleOutcome::Denied);
        };
        if target == caller {
            return Ok(RoleOutcome::SelfRemove);
        }
        let Some(current) = self.guard.role(chat, target)? else {
            return Ok(RoleOutcome::NoRole);
        };
        if Self::outranks(&auth, Some(current)) {
            return Ok(RoleOutcome::TargetOutranks);
        }

        self.db.remove_role(chat, target).await?;
        info!(%chat, %caller, %target, previous = current.level(), "Role removed");
        Ok(RoleOutcome::Removed { previous: current })
    }

    /// Raise `target` by one level; a user without a role becomes level 1
    pub async fn promote(
        &self,
        chat: ChatId,
        caller: UserId,
        target: UserId,
        now: DateTime<Utc>,
    ) -> ModerationResult<RoleOutcome> {
        let Some(auth) = self.owner(chat, caller).await? else {
            return Ok(RoleOutcome::Denied);
        };
        let current = self.guard.role(chat, target)?;
        let next = match current {
            None => Role::JuniorModerator,
            Some(role) => match role.promoted() {
                Some(next) => next,
                None => return Ok(RoleOutcome::AtMax),
            },
        };
        if Self::outranks(&auth, current) {
            return Ok(RoleOutcome::TargetOutranks);
        }
        if next.level() >= auth.level() {
            return Ok(RoleOutcome::TooHigh);
        }

        self.db
            .set_role(chat, target, next, Some(caller), None, now)
            .await?;
        info!(%chat, %caller, %target, role = next.level(), "Role promoted");
        Ok(RoleOutcome::Promoted { role: next })
    }

    /// Lower `target` by one level; level 1 is the floor
    pub async fn demote(
        &self,
        chat: ChatId,
        caller: UserId,
        target: UserId,
        now: DateTime<Utc>,
    ) -> ModerationResult<RoleOutcome> {
        let Some(auth) = self.owner(chat, caller).await? else {
            return Ok(RoleOutcome::Denied);
        };
        if target == caller {
            return Ok(RoleOutcome::SelfDemote);
        }
        let Some(current) = self.guard.role(chat, target)? else {
            return Ok(RoleOutcome::NoRole);
        };
        let Some(next) = current.demoted() else {
            return Ok(RoleOutcome::AtMin);
        };
        if Self::outranks(&auth, Some(current)) {
            return Ok(RoleOutcome::TargetOutranks);
        }

        self.db
            .set_role(chat, target, next, Some(caller), None, now)
            .await?;
        info!(%chat, %caller, %target, role = next.level(), "Role demoted");
        Ok(RoleOutcome::Demoted { role: next })
    }

    /// Make the platform creator of `chat` an Owner.
    ///
    /// Returns the owner's id, or `None` when the administrator list could
    /// not be fetched or has no creator.
    pub async fn reconcile_owner(
        &self,
        platform: &dyn ChatPlatform,
        chat: ChatId,
        now: DateTime<Utc>,
    ) -> ModerationResult<Option<UserId>> {
        let admins = match platform.get_chat_administrators(chat).await {
            Ok(admins) => admins,
            Err(e) => {
                warn!(%chat, error = %e, "Could not fetch administrators for owner reconciliation");
                return Ok(None);
            }
        };

        let Some(creator) = admins.iter().find(|m| m.status == MemberStatus::Creator) else {
            debug!(%chat, "No creator among administrators");
            return Ok(None);
        };

        let upsert = self
            .db
            .set_role(chat, creator.user.id, Role::Owner, None, None, now)
            .await?;
        info!(%chat, owner = %creator.user.id, ?upsert, "Chat owner reconciled");
        Ok(Some(creator.user.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ChatMember, MockChatPlatform, PlatformError, UserProfile};
    use woxl_common::test_utils::mock_timestamp;
    use woxl_config::Config;

    const CHAT: ChatId = ChatId(100);
    const OWNER: UserId = UserId(1);
    const TARGET: UserId = UserId(42);

    fn profile(id: UserId) -> UserProfile {
        UserProfile {
            id,
            first_name: format!("user{id}"),
            last_name: None,
            username: None,
            is_bot: false,
        }
    }

    async fn manager_with(platform: MockChatPlatform, fallback: bool) -> (RoleManager, Database) {
        let db = Database::temporary().unwrap();
        db.set_role(CHAT, OWNER, Role::Owner, None, None, mock_timestamp(2025, 1, 1, 0, 0, 0))
            .await
            .unwrap();
        let guard = RoleGuard::new(db.clone(), Arc::new(platform), fallback_config(fallback));
        (RoleManager::new(guard, db.clone()), db)
    }

    fn fallback_config(fallback: bool) -> Arc<ConfigCache> {
        let mut config = Config::default();
        config.moderation.platform_admin_fallback = fallback;
        Arc::new(ConfigCache::new(config))
    }

    async fn set(db: &Database, user: UserId, role: Role) {
        db.set_role(CHAT, user, role, None, None, mock_timestamp(2025, 1, 1, 0, 0, 0))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_absent_role_is_level_zero() {
        let (manager, _) = manager_with(MockChatPlatform::new(), false).await;
        assert_eq!(manager.guard().level(CHAT, TARGET).await.unwrap(), 0);
        let access = manager
            .guard()
            .authorize(CHAT, TARGET, Role::JuniorModerator)
            .await
            .unwrap();
        assert_eq!(access, Access::Denied { level: 0 });
    }

    #[tokio::test]
    async fn test_platform_fallback_ranks_creator_and_admin() {
        let mut platform = MockChatPlatform::new();
        platform.expect_get_chat_member().returning(|_, user| {
            let status = if user == UserId(7) {
                MemberStatus::Creator
            } else {
                MemberStatus::Administrator
            };
            Ok(ChatMember {
                user: profile(user),
                status,
            })
        });
        let (manager, _) = manager_with(platform, true).await;
        assert_eq!(manager.guard().level(CHAT, UserId(7)).await.unwrap(), 5);
        assert_eq!(manager.guard().level(CHAT, UserId(8)).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_fallback_follows_config_updates() {
        let mut platform = MockChatPlatform::new();
        platform.expect_get_chat_member().returning(|_, user| {
            Ok(ChatMember {
                user: profile(user),
                status: MemberStatus::Creator,
            })
        });
        let db = Database::temporary().unwrap();
        let config = fallback_config(false);
        let guard = RoleGuard::new(db, Arc::new(platform), Arc::clone(&config));
        assert_eq!(guard.level(CHAT, UserId(7)).await.unwrap(), 0);

        let mut reloaded = Config::default();
        reloaded.moderation.platform_admin_fallback = true;
        config.update(reloaded);
        assert_eq!(guard.level(CHAT, UserId(7)).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_fallback_lookup_failure_is_no_role() {
        let mut platform = MockChatPlatform::new();
        platform
            .expect_get_chat_member()
            .returning(|_, _| Err(PlatformError::Transport("down".into())));
        let (manager, _) = manager_with(platform, true).await;
        assert_eq!(manager.guard().level(CHAT, TARGET).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_promote_and_demote_boundaries() {
        let (manager, db) = manager_with(MockChatPlatform::new(), false).await;
        let now = mock_timestamp(2025, 1, 2, 0, 0, 0);

        set(&db, TARGET, Role::SeniorModerator).await;
        assert_eq!(
            manager.promote(CHAT, OWNER, TARGET, now).await.unwrap(),
            RoleOutcome::Promoted { role: Role::Administrator }
        );

        set(&db, TARGET, Role::Owner).await;
        assert_eq!(manager.promote(CHAT, OWNER, TARGET, now).await.unwrap(), RoleOutcome::AtMax);
        assert_eq!(manager.guard().role(CHAT, TARGET).unwrap(), Some(Role::Owner));

        set(&db, TARGET, Role::JuniorModerator).await;
        assert_eq!(manager.demote(CHAT, OWNER, TARGET, now).await.unwrap(), RoleOutcome::AtMin);
        assert_eq!(
            manager.guard().role(CHAT, TARGET).unwrap(),
            Some(Role::JuniorModerator)
        );
    }

    #[tokio::test]
    async fn test_promote_from_nothing_and_cap_below_owner() {
        let (manager, db) = manager_with(MockChatPlatform::new(), false).await;
        let now = mock_timestamp(2025, 1, 2, 0, 0, 0);

        assert_eq!(
            manager.promote(CHAT, OWNER, TARGET, now).await.unwrap(),
            RoleOutcome::Promoted { role: Role::JuniorModerator }
        );

        set(&db, TARGET, Role::Administrator).await;
        assert_eq!(manager.promote(CHAT, OWNER, TARGET, now).await.unwrap(), RoleOutcome::TooHigh);
    }

    #[tokio::test]
    async fn test_only_owner_manages_roles() {
        let (manager, db) = manager_with(MockChatPlatform::new(), false).await;
        let now = mock_timestamp(2025, 1, 2, 0, 0, 0);
        set(&db, UserId(2), Role::Administrator).await;

        let outcome = manager
            .assign(CHAT, UserId(2), TARGET, Role::JuniorModerator, now)
            .await
            .unwrap();
        assert_eq!(outcome, RoleOutcome::Denied);
        assert_eq!(manager.guard().role(CHAT, TARGET).unwrap(), None);
    }

    #[tokio::test]
    async fn test_assign_reports_upsert() {
        let (manager, _) = manager_with(MockChatPlatform::new(), false).await;
        let now = mock_timestamp(2025, 1, 2, 0, 0, 0);

        assert_eq!(
            manager.assign(CHAT, OWNER, TARGET, Role::Moderator, now).await.unwrap(),
            RoleOutcome::Assigned {
                role: Role::Moderator,
                upsert: RoleUpsert::Created
            }
        );
        assert_eq!(
            manager.assign(CHAT, OWNER, TARGET, Role::Administrator, now).await.unwrap(),
            RoleOutcome::Assigned {
                role: Role::Administrator,
                upsert: RoleUpsert::Updated {
                    previous: Role::Moderator
                }
            }
        );
        assert_eq!(
            manager.assign(CHAT, OWNER, TARGET, Role::Owner, now).await.unwrap(),
            RoleOutcome::TooHigh
        );
    }

    #[tokio::test]
    async fn test_self_changes_rejected() {
        let (manager, _) = manager_with(MockChatPlatform::new(), false).await;
        let now = mock_timestamp(2025, 1, 2, 0, 0, 0);
        assert_eq!(manager.remove(CHAT, OWNER, OWNER).await.unwrap(), RoleOutcome::SelfRemove);
        assert_eq!(manager.demote(CHAT, OWNER, OWNER, now).await.unwrap(), RoleOutcome::SelfDemote);
        assert_eq!(manager.remove(CHAT, OWNER, TARGET).await.unwrap(), RoleOutcome::NoRole);
    }

    #[tokio::test]
    async fn test_other_owner_cannot_be_removed() {
        let (manager, db) = manager_with(MockChatPlatform::new(), false).await;
        set(&db, TARGET, Role::Owner).await;
        assert_eq!(
            manager.remove(CHAT, OWNER, TARGET).await.unwrap(),
            RoleOutcome::TargetOutranks
        );
    }

    #[tokio::test]
    async fn test_reconcile_owner() {
        let mut platform = MockChatPlatform::new();
        platform.expect_get_chat_administrators().returning(|_| {
            Ok(vec![
                ChatMember {
                    user: profile(UserId(2)),
                    status: MemberStatus::Administrator,
                },
                ChatMember {
                    user: profile(UserId(3)),
                    status: MemberStatus::Creator,
                },
            ])
        });
        let (manager, db) = manager_with(MockChatPlatform::new(), false).await;
        set(&db, UserId(3), Role::Moderator).await;

        let owner = manager
            .reconcile_owner(&platform, CHAT, mock_timestamp(2025, 1, 2, 0, 0, 0))
            .await
            .unwrap();
        assert_eq!(owner, Some(UserId(3)));
        let assignment = db.get_role(CHAT, UserId(3)).unwrap().unwrap();
        assert_eq!(assignment.role, Role::Owner);
        assert_eq!(assignment.assigned_by, None);
    }

    #[tokio::test]
    async fn test_reconcile_owner_swallows_lookup_failure() {
        let mut platform = MockChatPlatform::new();
        platform
            .expect_get_chat_administrators()
            .returning(|_| Err(PlatformError::Api { code: 403, description: "Forbidden".into() }));
        let (manager, _) = manager_with(MockChatPlatform::new(), false).await;
        let owner = manager
            .reconcile_owner(&platform, CHAT, mock_timestamp(2025, 1, 2, 0, 0, 0))
            .await
            .unwrap();
        assert_eq!(owner, None);
    }
}
