//! Routes incoming updates to their handlers

use crate::context::CommandContext;
use crate::error::CommandResult;
use crate::membership::{bot_membership_changed, MembershipChange};
use crate::roles::RoleStep;
use crate::triggers::{Command, CommandText};
use crate::{actions, diagnostics, greeting, lists, new_year, nicks, raven, roles};
use tracing::{debug, error, instrument, warn};
use woxl_moderation::{IncomingCallback, IncomingMessage};

/// Entry point for every update the transport receives.
///
/// Handler failures are logged and answered with a generic notice; they
/// never propagate to the polling loop.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    ctx: CommandContext,
}

impl Dispatcher {
    /// Create a dispatcher over shared state
    #[must_use]
    pub const fn new(ctx: CommandContext) -> Self {
        Self { ctx }
    }

    /// Shared handler state
    #[must_use]
    pub const fn context(&self) -> &CommandContext {
        &self.ctx
    }

    /// Handle a chat message. Returns the command it triggered, if any.
    #[instrument(skip(self, message), fields(chat = %message.chat_id, from = %message.from.id))]
    pub async fn handle_message(&self, message: &IncomingMessage) -> Option<Command> {
        let text = CommandText::new(&message.text, self.ctx.bot_username.as_deref())?;
        let matched = text.matched()?;
        debug!(command = ?matched.command, "Dispatching command");

        if let Err(e) = self.route(message, matched.command, matched.args).await {
            error!(command = ?matched.command, error = %e, "Command failed");
            let notice = self.ctx.t("common-internal-error", None);
            if let Err(e) = self.ctx.reply(message, &notice).await {
                warn!(error = %e, "Could not deliver error notice");
            }
        }
        Some(matched.command)
    }

    async fn route(&self, message: &IncomingMessage, command: Command, args: &str) -> CommandResult<()> {
        let ctx = &self.ctx;
        match command {
            Command::Grant(kind) => actions::grant(ctx, message, kind, args).await,
            Command::Revoke(kind) => actions::revoke(ctx, message, kind, args).await,
            Command::List(kind) => lists::list(ctx, message, kind, args).await,
            Command::Kick => actions::kick(ctx, message, args).await,
            Command::Staff => roles::staff(ctx, message).await,
            Command::AssignRole => roles::assign(ctx, message, args).await,
            Command::RemoveRole => roles::step(ctx, message, RoleStep::Remove, args).await,
            Command::Promote => roles::step(ctx, message, RoleStep::Promote, args).await,
            Command::Demote => roles::step(ctx, message, RoleStep::Demote, args).await,
            Command::SetNick => nicks::set(ctx, message, args).await,
            Command::DeleteNick => nicks::delete(ctx, message).await,
            Command::ShowNick => nicks::show(ctx, message, args).await,
            Command::Nick => nicks::nick(ctx, message, args).await,
            Command::Start => greeting::start(ctx, message).await,
            Command::Ping => diagnostics::ping(ctx, message, args).await,
            Command::Raven => raven::send_raven(ctx, message, args).await,
            Command::NewYear => new_year::countdown(ctx, message).await,
        }
    }

    /// Handle an inline button press
    #[instrument(skip(self, callback), fields(chat = %callback.chat_id, data = %callback.data))]
    pub async fn handle_callback(&self, callback: &IncomingCallback) {
        if let Err(e) = lists::change_page(&self.ctx, callback).await {
            error!(error = %e, "Page change failed");
            let notice = self.ctx.t("common-internal-error", None);
            if let Err(e) = self.ctx.platform.answer_callback(&callback.id, Some(notice)).await {
                warn!(error = %e, "Could not answer callback");
            }
        }
    }

    /// Handle a change of the bot's own membership
    pub async fn handle_membership(&self, change: MembershipChange) {
        if let Err(e) = bot_membership_changed(&self.ctx, change).await {
            error!(chat = %change.chat_id, error = %e, "Membership handling failed");
        }
    }
}
