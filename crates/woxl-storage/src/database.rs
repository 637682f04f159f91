//! sled-backed store for every persisted record set
//!
//! Reads are synchronous; writes are `async` because they flush the tree
//! before returning, so a confirmed command survives a crash.

use crate::error::StorageResult;
use crate::keys::{chat_key, member_key, record_key};
use crate::models::{ChatRecord, NewAction, Nick, PunitiveRecord, RecordState, RoleAssignment};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::{debug, info};
use woxl_common::{ActionKind, ChatId, Role, UserId};

/// Options for opening the database
#[derive(Debug, Clone)]
pub struct StorageOptions {
    /// Directory of the database files
    pub path: PathBuf,
    /// Page cache size in bytes
    pub cache_capacity_bytes: u64,
    /// Background flush interval
    pub flush_every_ms: u64,
}

impl StorageOptions {
    /// Options with default tuning for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache_capacity_bytes: 64 * 1024 * 1024,
            flush_every_ms: 1000,
        }
    }
}

/// Outcome of a role upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleUpsert {
    /// No previous assignment existed
    Created,
    /// An existing assignment was overwritten
    Updated {
        /// Role before the write
        previous: Role,
    },
}

/// Handle to the moderation database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    db: sled::Db,
    chats: sled::Tree,
    roles: sled::Tree,
    nicks: sled::Tree,
    warns: sled::Tree,
    mutes: sled::Tree,
    bans: sled::Tree,
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

impl Database {
    /// Open (or create) the database
    pub fn open(options: &StorageOptions) -> StorageResult<Self> {
        info!(path = %options.path.display(), "Opening moderation database");

        let db = sled::Config::default()
            .path(&options.path)
            .cache_capacity(options.cache_capacity_bytes)
            .flush_every_ms(Some(options.flush_every_ms))
            .open()?;

        Self::from_db(db)
    }

    /// In-memory database removed on drop
    pub fn temporary() -> StorageResult<Self> {
        Self::from_db(sled::Config::default().temporary(true).open()?)
    }

    fn from_db(db: sled::Db) -> StorageResult<Self> {
        Ok(Self {
            chats: db.open_tree("chats")?,
            roles: db.open_tree("roles")?,
            nicks: db.open_tree("nicks")?,
            warns: db.open_tree("warns")?,
            mutes: db.open_tree("mutes")?,
            bans: db.open_tree("bans")?,
            db,
        })
    }

    const fn action_tree(&self, kind: ActionKind) -> &sled::Tree {
        match kind {
            ActionKind::Warn => &self.warns,
            ActionKind::Mute => &self.mutes,
            ActionKind::Ban => &self.bans,
        }
    }

    /// Persist all pending writes
    pub async fn flush(&self) -> StorageResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    // Chats

    /// Record a chat on first interaction. Returns `true` if it was new.
    pub async fn register_chat(&self, chat: ChatId, now: DateTime<Utc>) -> StorageResult<bool> {
        let record = ChatRecord {
            id: chat,
            registered_at: now,
        };
        let inserted = self
            .chats
            .compare_and_swap(chat_key(chat), None as Option<&[u8]>, Some(serde_json::to_vec(&record)?))?
            .is_ok();

        if inserted {
            self.chats.flush_async().await?;
            info!(%chat, "Registered new chat");
        }
        Ok(inserted)
    }

    /// Number of registered chats
    #[must_use]
    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }

    // Roles

    /// Role assignment of a user, if any
    pub fn get_role(&self, chat: ChatId, user: UserId) -> StorageResult<Option<RoleAssignment>> {
        self.roles
            .get(member_key(chat, user))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Create or overwrite a user's role
    pub async fn set_role(
        &self,
        chat: ChatId,
        user: UserId,
        role: Role,
        assigned_by: Option<UserId>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> StorageResult<RoleUpsert> {
        let assignment = RoleAssignment {
            chat_id: chat,
            user_id: user,
            role,
            assigned_by,
            assigned_at: now,
            reason,
        };
        let previous = self
            .roles
            .insert(member_key(chat, user), serde_json::to_vec(&assignment)?)?;
        self.roles.flush_async().await?;

        let outcome = match previous {
            Some(bytes) => RoleUpsert::Updated {
                previous: decode::<RoleAssignment>(&bytes)?.role,
            },
            None => RoleUpsert::Created,
        };
        debug!(%chat, %user, role = role.level(), ?outcome, "Stored role assignment");
        Ok(outcome)
    }

    /// Delete a user's role. Returns the removed assignment, if any.
    pub async fn remove_role(
        &self,
        chat: ChatId,
        user: UserId,
    ) -> StorageResult<Option<RoleAssignment>> {
        let removed = self.roles.remove(member_key(chat, user))?;
        if removed.is_some() {
            self.roles.flush_async().await?;
            debug!(%chat, %user, "Removed role assignment");
        }
        removed.map(|bytes| decode(&bytes)).transpose()
    }

    /// All role assignments of a chat, highest role first
    pub fn list_roles(&self, chat: ChatId) -> StorageResult<Vec<RoleAssignment>> {
        let mut roles = self
            .roles
            .scan_prefix(chat_key(chat))
            .map(|item| decode::<RoleAssignment>(&item?.1))
            .collect::<StorageResult<Vec<_>>>()?;
        roles.sort_by(|a, b| {
            b.role
                .cmp(&a.role)
                .then(a.assigned_at.cmp(&b.assigned_at))
                .then(a.user_id.cmp(&b.user_id))
        });
        Ok(roles)
    }

    // Nicknames

    /// Nickname of a user, if set
    pub fn get_nick(&self, chat: ChatId, user: UserId) -> StorageResult<Option<Nick>> {
        self.nicks
            .get(member_key(chat, user))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Set or replace a nickname
    pub async fn set_nick(
        &self,
        chat: ChatId,
        user: UserId,
        nick: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Nick> {
        let record = Nick {
            chat_id: chat,
            user_id: user,
            nick: nick.to_string(),
            updated_at: now,
        };
        self.nicks
            .insert(member_key(chat, user), serde_json::to_vec(&record)?)?;
        self.nicks.flush_async().await?;
        Ok(record)
    }

    /// Delete a nickname. Returns `true` if one existed.
    pub async fn remove_nick(&self, chat: ChatId, user: UserId) -> StorageResult<bool> {
        let removed = self.nicks.remove(member_key(chat, user))?.is_some();
        if removed {
            self.nicks.flush_async().await?;
        }
        Ok(removed)
    }

    // Punitive records

    /// Persist a new active record
    pub async fn create_action(&self, new: NewAction) -> StorageResult<PunitiveRecord> {
        let record = PunitiveRecord {
            id: self.db.generate_id()?,
            kind: new.kind,
            chat_id: new.chat_id,
            user_id: new.user_id,
            issued_by: new.issued_by,
            reason: new.reason,
            until: new.until,
            state: RecordState::Active,
            created_at: new.created_at,
        };

        let tree = self.action_tree(record.kind);
        tree.insert(record_key(record.chat_id, record.id), serde_json::to_vec(&record)?)?;
        tree.flush_async().await?;

        info!(
            kind = %record.kind,
            chat = %record.chat_id,
            user = %record.user_id,
            id = record.id,
            "Created punitive record"
        );
        Ok(record)
    }

    fn active_entries(
        &self,
        kind: ActionKind,
        chat: ChatId,
        user: Option<UserId>,
    ) -> StorageResult<Vec<(sled::IVec, PunitiveRecord)>> {
        let mut entries = Vec::new();
        for item in self.action_tree(kind).scan_prefix(chat_key(chat)) {
            let (_, bytes) = item?;
            let record: PunitiveRecord = decode(&bytes)?;
            if record.is_active() && user.map_or(true, |u| record.user_id == u) {
                entries.push((bytes, record));
            }
        }
        entries.sort_by(|(_, a), (_, b)| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    /// Active records of a chat, optionally for one user, newest first
    pub fn list_active(
        &self,
        kind: ActionKind,
        chat: ChatId,
        user: Option<UserId>,
    ) -> StorageResult<Vec<PunitiveRecord>> {
        Ok(self
            .active_entries(kind, chat, user)?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Revoke the newest active record of a user.
    ///
    /// Returns the revoked record, or `None` when nothing is active.
    /// Concurrent revocations never revoke the same record twice.
    pub async fn revoke_latest(
        &self,
        kind: ActionKind,
        chat: ChatId,
        user: UserId,
        revoked_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<PunitiveRecord>> {
        let tree = self.action_tree(kind);
        loop {
            let Some((current, mut record)) =
                self.active_entries(kind, chat, Some(user))?.into_iter().next()
            else {
                return Ok(None);
            };

            record.revoke(now, revoked_by);
            let swapped = tree.compare_and_swap(
                record_key(chat, record.id),
                Some(current),
                Some(serde_json::to_vec(&record)?),
            )?;

            if swapped.is_ok() {
                tree.flush_async().await?;
                info!(%kind, %chat, %user, id = record.id, "Revoked punitive record");
                return Ok(Some(record));
            }
            debug!(%kind, %chat, %user, id = record.id, "Record changed concurrently, retrying");
        }
    }

    /// Lifetime number of records for a user, revoked ones included
    pub fn count_for_user(
        &self,
        kind: ActionKind,
        chat: ChatId,
        user: UserId,
    ) -> StorageResult<usize> {
        let mut count = 0;
        for item in self.action_tree(kind).scan_prefix(chat_key(chat)) {
            let record: PunitiveRecord = decode(&item?.1)?;
            if record.user_id == user {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;
    use woxl_common::test_utils::mock_timestamp;

    fn new_action(kind: ActionKind, user: i64, created_at: DateTime<Utc>) -> NewAction {
        NewAction {
            kind,
            chat_id: ChatId(100),
            user_id: UserId(user),
            issued_by: Some(UserId(1)),
            reason: None,
            until: None,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_register_chat_once() {
        let db = Database::temporary().unwrap();
        let now = mock_timestamp(2025, 1, 1, 0, 0, 0);
        assert!(db.register_chat(ChatId(1), now).await.unwrap());
        assert!(!db.register_chat(ChatId(1), now).await.unwrap());
        assert!(db.register_chat(ChatId(2), now).await.unwrap());
        assert_eq!(db.chat_count(), 2);
    }

    #[tokio::test]
    async fn test_role_upsert_and_removal() {
        let db = Database::temporary().unwrap();
        let now = mock_timestamp(2025, 1, 1, 0, 0, 0);
        let (chat, user) = (ChatId(1), UserId(2));

        assert_eq!(db.get_role(chat, user).unwrap(), None);
        let first = db
            .set_role(chat, user, Role::Moderator, Some(UserId(9)), None, now)
            .await
            .unwrap();
        assert_eq!(first, RoleUpsert::Created);

        let second = db
            .set_role(chat, user, Role::Administrator, None, None, now)
            .await
            .unwrap();
        assert_eq!(
            second,
            RoleUpsert::Updated {
                previous: Role::Moderator
            }
        );
        assert_eq!(db.get_role(chat, user).unwrap().unwrap().role, Role::Administrator);

        assert!(db.remove_role(chat, user).await.unwrap().is_some());
        assert!(db.remove_role(chat, user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_roles_is_scoped_and_sorted() {
        let db = Database::temporary().unwrap();
        let now = mock_timestamp(2025, 1, 1, 0, 0, 0);
        db.set_role(ChatId(1), UserId(10), Role::JuniorModerator, None, None, now)
            .await
            .unwrap();
        db.set_role(ChatId(1), UserId(11), Role::Owner, None, None, now)
            .await
            .unwrap();
        db.set_role(ChatId(2), UserId(12), Role::Owner, None, None, now)
            .await
            .unwrap();

        let roles = db.list_roles(ChatId(1)).unwrap();
        let users: Vec<UserId> = roles.iter().map(|r| r.user_id).collect();
        assert_eq!(users, vec![UserId(11), UserId(10)]);
    }

    #[tokio::test]
    async fn test_nick_lifecycle() {
        let db = Database::temporary().unwrap();
        let now = mock_timestamp(2025, 1, 1, 0, 0, 0);
        let (chat, user) = (ChatId(1), UserId(2));

        db.set_nick(chat, user, "Wox", now).await.unwrap();
        assert_eq!(db.get_nick(chat, user).unwrap().unwrap().nick, "Wox");
        db.set_nick(chat, user, "Woxl", now).await.unwrap();
        assert_eq!(db.get_nick(chat, user).unwrap().unwrap().nick, "Woxl");
        assert!(db.remove_nick(chat, user).await.unwrap());
        assert!(!db.remove_nick(chat, user).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_active_filters_and_orders() {
        let db = Database::temporary().unwrap();
        let t0 = mock_timestamp(2025, 1, 1, 0, 0, 0);

        db.create_action(new_action(ActionKind::Mute, 5, t0)).await.unwrap();
        db.create_action(new_action(ActionKind::Mute, 6, t0 + Duration::minutes(1)))
            .await
            .unwrap();
        db.create_action(new_action(ActionKind::Ban, 5, t0)).await.unwrap();

        let all = db.list_active(ActionKind::Mute, ChatId(100), None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].user_id, UserId(6));

        let scoped = db
            .list_active(ActionKind::Mute, ChatId(100), Some(UserId(5)))
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert!(db.list_active(ActionKind::Warn, ChatId(100), None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revoke_counts_remain() {
        let db = Database::temporary().unwrap();
        let t0 = mock_timestamp(2025, 1, 1, 0, 0, 0);
        db.create_action(new_action(ActionKind::Warn, 5, t0)).await.unwrap();
        db.revoke_latest(ActionKind::Warn, ChatId(100), UserId(5), None, t0)
            .await
            .unwrap();
        assert_eq!(
            db.count_for_user(ActionKind::Warn, ChatId(100), UserId(5)).unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = tempdir().unwrap();
        let options = StorageOptions::new(dir.path().join("db"));
        let now = mock_timestamp(2025, 1, 1, 0, 0, 0);

        {
            let db = Database::open(&options).unwrap();
            db.set_nick(ChatId(1), UserId(2), "persisted", now).await.unwrap();
        }

        let db = Database::open(&options).unwrap();
        assert_eq!(db.get_nick(ChatId(1), UserId(2)).unwrap().unwrap().nick, "persisted");
    }
}
