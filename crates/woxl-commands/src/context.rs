//! Shared state handed to every command handler

use crate::error::CommandResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use woxl_config::{Config, ConfigCache};
use woxl_i18n::{FluentArgs, I18nManager};
use woxl_moderation::{
    display_name, display_ref, ChatPlatform, IncomingMessage, InlineKeyboard, ModerationService,
    RoleGuard, RoleManager, UnitLabels,
};
use woxl_storage::Database;
use woxl_common::{ChatId, UserId};

/// Application state accessible from command handlers
#[derive(Clone)]
pub struct CommandContext {
    /// Live configuration
    pub config: Arc<ConfigCache>,
    /// Reply texts
    pub i18n: Arc<I18nManager>,
    /// Persistent store
    pub db: Database,
    /// Messaging platform
    pub platform: Arc<dyn ChatPlatform>,
    /// Punitive action service
    pub moderation: ModerationService,
    /// Role guard and management
    pub roles: RoleManager,
    /// Bot account username, used to filter `/cmd@other_bot`
    pub bot_username: Option<String>,
    /// Process start, for uptime reports
    pub started_at: DateTime<Utc>,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("bot_username", &self.bot_username)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl CommandContext {
    /// Wire the services together
    pub fn new(
        config: Arc<ConfigCache>,
        i18n: Arc<I18nManager>,
        db: Database,
        platform: Arc<dyn ChatPlatform>,
        bot_username: Option<String>,
    ) -> Self {
        let guard = RoleGuard::new(db.clone(), Arc::clone(&platform), Arc::clone(&config));
        Self {
            moderation: ModerationService::new(db.clone(), Arc::clone(&platform)),
            roles: RoleManager::new(guard, db.clone()),
            config,
            i18n,
            db,
            platform,
            bot_username,
            started_at: Utc::now(),
        }
    }

    /// Current configuration snapshot
    #[must_use]
    pub fn settings(&self) -> Arc<Config> {
        self.config.get()
    }

    /// The role guard
    #[must_use]
    pub const fn guard(&self) -> &RoleGuard {
        self.roles.guard()
    }

    /// Format a reply text
    #[must_use]
    pub fn t(&self, key: &str, args: Option<&FluentArgs>) -> String {
        self.i18n.t(key, args)
    }

    /// Localised remaining-time suffixes
    #[must_use]
    pub fn unit_labels(&self) -> UnitLabels {
        UnitLabels {
            day: self.t("unit-day", None),
            hour: self.t("unit-hour", None),
            minute: self.t("unit-minute", None),
            second: self.t("unit-second", None),
            expired: self.t("unit-expired", None),
        }
    }

    /// Reply to a message
    pub async fn reply(&self, message: &IncomingMessage, text: &str) -> CommandResult<()> {
        self.platform
            .send_message(message.chat_id, text, Some(message.message_id), None)
            .await?;
        Ok(())
    }

    /// Reply to a message with inline buttons
    pub async fn reply_with_keyboard(
        &self,
        message: &IncomingMessage,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> CommandResult<()> {
        self.platform
            .send_message(message.chat_id, text, Some(message.message_id), Some(keyboard))
            .await?;
        Ok(())
    }

    /// Linked display reference of a user
    pub async fn user_ref(&self, chat: ChatId, user: UserId, hint: Option<&str>) -> String {
        display_ref(&self.db, self.platform.as_ref(), chat, user, hint).await
    }

    /// Plain display name of a user
    pub async fn user_name(&self, chat: ChatId, user: UserId, hint: Option<&str>) -> String {
        display_name(&self.db, self.platform.as_ref(), chat, user, hint).await
    }
}
