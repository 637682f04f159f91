//! Long-polling loop that feeds updates to the dispatcher.

use crate::api::{BotCommand, CallbackQuery, ChatMemberUpdated, Message, Update};
use crate::error::BotResult;
use crate::telegram::TelegramClient;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use woxl_commands::{CommandContext, Dispatcher};
use woxl_config::ConfigCache;
use woxl_i18n::{I18nManager, Locale};
use woxl_moderation::ChatPlatform;
use woxl_storage::{Database, StorageOptions};

const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// Main bot structure.
#[derive(Debug)]
pub struct WoxlBot {
    config: Arc<ConfigCache>,
    client: Arc<TelegramClient>,
    dispatcher: Dispatcher,
}

impl WoxlBot {
    /// Opens the database, loads translations and identifies the bot account.
    pub async fn new(config: Arc<ConfigCache>) -> BotResult<Self> {
        let settings = config.get();
        let client = Arc::new(TelegramClient::new(&settings.telegram)?);

        let db = Database::open(&StorageOptions {
            path: settings.storage.path.clone(),
            cache_capacity_bytes: settings.storage.cache_capacity_bytes,
            flush_every_ms: settings.storage.flush_every_ms,
        })?;

        let locale = Locale::from_code(&settings.bot.locale).unwrap_or(Locale::Russian);
        let i18n = Arc::new(I18nManager::new(locale)?);

        let me = client.get_me().await?;
        info!(id = %me.id, username = ?me.username, "Authorized with the Bot API");

        let ctx = CommandContext::new(Arc::clone(&config), i18n, db, client.clone(), me.username);
        Ok(Self {
            config,
            client,
            dispatcher: Dispatcher::new(ctx),
        })
    }

    /// Registers the slash-command menu; failures are only logged.
    pub async fn register_commands(&self) {
        let ctx = self.dispatcher.context();
        let commands = [("start", "menu-start"), ("admins", "menu-admins"), ("ping", "menu-ping")]
            .into_iter()
            .map(|(command, key)| BotCommand {
                command: command.to_string(),
                description: ctx.t(key, None),
            })
            .collect::<Vec<_>>();

        match self.client.set_my_commands(&commands).await {
            Ok(()) => info!(count = commands.len(), "Registered command menu"),
            Err(e) => warn!(error = %e, "Could not register command menu"),
        }
    }

    fn spawn_update(&self, update: Update) {
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            debug!(update_id = update.update_id, "Handling update");
            if let Some(message) = update.message.and_then(Message::into_incoming) {
                dispatcher.handle_message(&message).await;
            } else if let Some(callback) = update.callback_query.and_then(CallbackQuery::into_incoming) {
                dispatcher.handle_callback(&callback).await;
            } else if let Some(change) = update.my_chat_member.and_then(ChatMemberUpdated::into_change) {
                dispatcher.handle_membership(change).await;
            }
        });
    }

    /// Polls until `shutdown` resolves. Each update runs on its own task.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> BotResult<()> {
        self.register_commands().await;
        tokio::pin!(shutdown);

        let mut offset = 0_i64;
        info!("Polling for updates");
        loop {
            let timeout = self.config.get().telegram.poll_timeout_seconds;
            tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested, stopping polling");
                    break;
                }
                result = self.client.get_updates(offset, timeout) => match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            self.spawn_update(update);
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "getUpdates failed");
                        tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    }
                }
            }
        }

        self.dispatcher.context().db.flush().await?;
        Ok(())
    }
}
