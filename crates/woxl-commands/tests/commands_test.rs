//! End-to-end command scenarios against a recording platform

use chrono::{Duration, Utc};
use std::sync::Arc;
use woxl_commands::{Command, CommandContext, Dispatcher, MembershipChange};
use woxl_common::{ActionKind, ChatId, MessageId, Role, UserId};
use woxl_config::{Config, ConfigCache};
use woxl_i18n::{I18nManager, Locale};
use woxl_moderation::testing::{FakePlatform, PlatformCall};
use woxl_moderation::{
    IncomingCallback, IncomingMessage, MemberPermissions, MemberStatus, UserProfile,
    MIN_PLATFORM_RESTRICTION,
};
use woxl_storage::{Database, NewAction, RecordState};

const CHAT: ChatId = ChatId(100);
const OWNER: UserId = UserId(1);
const MODERATOR: UserId = UserId(2);
const TARGET: UserId = UserId(42);

struct Harness {
    dispatcher: Dispatcher,
    platform: Arc<FakePlatform>,
    db: Database,
    config: Arc<ConfigCache>,
}

impl Harness {
    async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    async fn with_config(config: Config) -> Self {
        let platform = Arc::new(FakePlatform::new());
        platform.add_member(CHAT, OWNER, "Owner", MemberStatus::Creator);
        platform.add_member(CHAT, MODERATOR, "Moder", MemberStatus::Member);
        platform.add_member(CHAT, TARGET, "Target", MemberStatus::Member);

        let db = Database::temporary().unwrap();
        db.set_role(CHAT, OWNER, Role::Owner, None, None, Utc::now())
            .await
            .unwrap();
        db.set_role(CHAT, MODERATOR, Role::Moderator, Some(OWNER), None, Utc::now())
            .await
            .unwrap();

        let config = Arc::new(ConfigCache::new(config));
        let ctx = CommandContext::new(
            Arc::clone(&config),
            Arc::new(I18nManager::new(Locale::Russian).unwrap()),
            db.clone(),
            platform.clone(),
            Some("woxl_bot".to_string()),
        );
        Self {
            dispatcher: Dispatcher::new(ctx),
            platform,
            db,
            config,
        }
    }

    async fn send(&self, from: UserId, text: &str, reply_to: Option<UserId>) -> Option<Command> {
        let message = IncomingMessage {
            chat_id: CHAT,
            chat_title: Some("Test chat".to_string()),
            message_id: MessageId(10),
            from: profile(from),
            text: text.to_string(),
            reply_to: reply_to.map(profile),
            text_mentions: Vec::new(),
        };
        self.dispatcher.handle_message(&message).await
    }

    fn reply(&self) -> String {
        self.platform.last_sent().unwrap_or_default()
    }

    async fn seed_warns(&self, count: i64) {
        let t0 = Utc::now() - Duration::hours(1);
        for i in 0..count {
            self.db
                .create_action(NewAction {
                    kind: ActionKind::Warn,
                    chat_id: CHAT,
                    user_id: TARGET,
                    issued_by: Some(OWNER),
                    reason: Some(format!("flood {i}")),
                    until: None,
                    created_at: t0 + Duration::seconds(i),
                })
                .await
                .unwrap();
        }
    }
}

fn profile(id: UserId) -> UserProfile {
    let first_name = match id {
        OWNER => "Owner",
        MODERATOR => "Moder",
        TARGET => "Target",
        _ => "Someone",
    };
    UserProfile {
        id,
        first_name: first_name.to_string(),
        last_name: None,
        username: None,
        is_bot: false,
    }
}

fn callback(data: &str) -> IncomingCallback {
    IncomingCallback {
        id: "cb-1".to_string(),
        from: profile(OWNER),
        chat_id: CHAT,
        message_id: MessageId(500),
        data: data.to_string(),
    }
}

#[tokio::test]
async fn test_mute_grant_then_revoke_twice() {
    let h = Harness::new().await;

    let before = Utc::now();
    let command = h.send(OWNER, "+мут 10м spam", Some(TARGET)).await;
    assert_eq!(command, Some(Command::Grant(ActionKind::Mute)));
    assert!(h.reply().contains("временно ограничен"));

    let active = h.db.list_active(ActionKind::Mute, CHAT, Some(TARGET)).unwrap();
    assert_eq!(active.len(), 1);
    let record = &active[0];
    assert_eq!(record.chat_id, CHAT);
    assert_eq!(record.issued_by, Some(OWNER));
    assert_eq!(record.reason.as_deref(), Some("spam"));
    let until = record.until.unwrap();
    assert!(until >= before + Duration::minutes(10));
    assert!(until <= Utc::now() + Duration::minutes(10));

    assert!(h.platform.calls().contains(&PlatformCall::Restrict {
        chat: CHAT,
        user: TARGET,
        permissions: MemberPermissions::muted(),
        until: Some(until),
    }));

    h.send(MODERATOR, "-мут", Some(TARGET)).await;
    assert!(h.reply().contains("был снят мут"));
    assert!(h.db.list_active(ActionKind::Mute, CHAT, Some(TARGET)).unwrap().is_empty());

    h.send(MODERATOR, "-мут 42", None).await;
    assert!(h.reply().contains("нет активных мутов"));
}

#[tokio::test]
async fn test_role_two_cannot_ban_but_can_warn() {
    let h = Harness::new().await;

    h.send(MODERATOR, "+бан 42 1д spam", None).await;
    assert!(h.reply().contains("нет прав для выдачи бана"));
    assert_eq!(h.db.count_for_user(ActionKind::Ban, CHAT, TARGET).unwrap(), 0);

    h.send(MODERATOR, "+пред 42 флуд", None).await;
    assert!(h.reply().contains("получил предупреждение"));
    let warns = h.db.list_active(ActionKind::Warn, CHAT, Some(TARGET)).unwrap();
    assert_eq!(warns.len(), 1);
    assert_eq!(warns[0].reason.as_deref(), Some("флуд"));
    assert_eq!(warns[0].until, None);
}

#[tokio::test]
async fn test_denied_before_usage() {
    let h = Harness::new().await;

    h.send(TARGET, "+бан", None).await;
    assert!(h.reply().contains("нет прав для выдачи бана"));

    h.send(OWNER, "+бан", None).await;
    assert!(h.reply().contains("Справка по команде"));
}

#[tokio::test]
async fn test_ban_of_absent_member_is_refused() {
    let h = Harness::new().await;

    h.send(OWNER, "+бан 9999 1д spam", None).await;
    assert!(h.reply().contains("Невозможно выдать бан"));
    assert_eq!(h.db.count_for_user(ActionKind::Ban, CHAT, UserId(9999)).unwrap(), 0);
}

#[tokio::test]
async fn test_platform_failure_keeps_record() {
    let h = Harness::new().await;
    h.platform.fail_effects(true);

    h.send(OWNER, "+мут 1ч", Some(TARGET)).await;
    assert!(h.reply().contains("временно ограничен"));
    assert_eq!(h.db.list_active(ActionKind::Mute, CHAT, None).unwrap().len(), 1);
}

#[tokio::test]
async fn test_handle_target_gets_guidance() {
    let h = Harness::new().await;

    h.send(OWNER, "+пред @someone spam", None).await;
    assert!(h.reply().contains("без @username"));
    assert!(h.db.list_active(ActionKind::Warn, CHAT, None).unwrap().is_empty());
}

#[tokio::test]
async fn test_list_pages_and_navigation() {
    let h = Harness::new().await;
    h.seed_warns(12).await;

    h.send(MODERATOR, "?пред", None).await;
    let calls = h.platform.calls();
    let Some(PlatformCall::Send { text, keyboard, .. }) = calls.last() else {
        panic!("expected a list reply");
    };
    assert!(text.contains("1/2"));
    assert!(text.contains("flood 11"));
    assert!(!text.contains("flood 1;"));
    let buttons = &keyboard.as_ref().unwrap()[0];
    assert_eq!(buttons[0].callback_data, "warns:1");
    assert_eq!(buttons[1].callback_data, "warns:2");

    h.platform.clear_calls();
    h.dispatcher.handle_callback(&callback("warns:2")).await;
    let calls = h.platform.calls();
    assert!(matches!(
        &calls[0],
        PlatformCall::Edit { message: MessageId(500), text, .. } if text.contains("2/2") && text.contains("11.")
    ));
    assert_eq!(
        calls[1],
        PlatformCall::Answer {
            callback_id: "cb-1".to_string(),
            notice: None
        }
    );
}

#[tokio::test]
async fn test_page_change_on_emptied_list_is_silent() {
    let h = Harness::new().await;
    h.seed_warns(1).await;
    h.db.revoke_latest(ActionKind::Warn, CHAT, TARGET, Some(OWNER), Utc::now())
        .await
        .unwrap();

    h.dispatcher.handle_callback(&callback("warns:1")).await;
    assert_eq!(
        h.platform.calls(),
        vec![PlatformCall::Answer {
            callback_id: "cb-1".to_string(),
            notice: None
        }]
    );
}

#[tokio::test]
async fn test_failed_page_edit_answers_with_notice() {
    let h = Harness::new().await;
    h.seed_warns(3).await;
    h.platform.fail_edits(true);

    h.dispatcher.handle_callback(&callback("warns:1")).await;
    let calls = h.platform.calls();
    assert!(matches!(
        calls.last(),
        Some(PlatformCall::Answer { notice: Some(notice), .. }) if notice.contains("Не удалось")
    ));
}

#[tokio::test]
async fn test_empty_list_has_no_pager() {
    let h = Harness::new().await;

    h.send(OWNER, "банлист", None).await;
    let calls = h.platform.calls();
    assert!(matches!(
        calls.last(),
        Some(PlatformCall::Send { keyboard: None, text, .. }) if text.contains("нет активных банов")
    ));
}

#[tokio::test]
async fn test_role_management_is_owner_only() {
    let h = Harness::new().await;

    h.send(MODERATOR, "повысить 42", None).await;
    assert_eq!(h.db.get_role(CHAT, TARGET).unwrap(), None);

    h.send(OWNER, "назначить 42 ст.модератор", None).await;
    assert_eq!(h.db.get_role(CHAT, TARGET).unwrap().unwrap().role, Role::SeniorModerator);

    h.send(OWNER, "повысить", Some(TARGET)).await;
    assert_eq!(h.db.get_role(CHAT, TARGET).unwrap().unwrap().role, Role::Administrator);

    h.send(OWNER, "повысить", Some(TARGET)).await;
    assert_eq!(h.db.get_role(CHAT, TARGET).unwrap().unwrap().role, Role::Administrator);

    h.send(OWNER, "снять роль 42", None).await;
    assert_eq!(h.db.get_role(CHAT, TARGET).unwrap(), None);
}

#[tokio::test]
async fn test_kick_bans_then_unbans() {
    let h = Harness::new().await;

    h.send(OWNER, "кик", Some(TARGET)).await;
    assert!(h.reply().contains("удалён из группы"));
    let calls = h.platform.calls();
    assert!(calls.contains(&PlatformCall::Ban {
        chat: CHAT,
        user: TARGET,
        until: None
    }));
    assert!(calls.contains(&PlatformCall::Unban {
        chat: CHAT,
        user: TARGET,
        only_if_banned: true
    }));
    assert_eq!(h.db.count_for_user(ActionKind::Ban, CHAT, TARGET).unwrap(), 0);
}

#[tokio::test]
async fn test_nick_shows_in_references() {
    let h = Harness::new().await;

    h.send(TARGET, "+ник Котик", None).await;
    assert!(h.reply().contains("Котик"));

    h.send(OWNER, "+пред 42", None).await;
    assert!(h.reply().contains(">Котик</a>"));

    h.send(TARGET, "-ник", None).await;
    h.send(TARGET, "-ник", None).await;
    assert!(h.reply().contains("и так нет"));
}

#[tokio::test]
async fn test_start_registers_chat() {
    let h = Harness::new().await;

    h.send(TARGET, "/start@woxl_bot", None).await;
    assert!(h.reply().contains("Woxl"));
    assert_eq!(h.db.chat_count(), 1);

    assert_eq!(h.send(TARGET, "/start@other_bot", None).await, None);
}

#[tokio::test]
async fn test_joining_chat_reconciles_owner() {
    let h = Harness::new().await;
    h.db.remove_role(CHAT, OWNER).await.unwrap();

    h.dispatcher
        .handle_membership(MembershipChange {
            chat_id: CHAT,
            status: MemberStatus::Administrator,
        })
        .await;

    assert_eq!(h.db.get_role(CHAT, OWNER).unwrap().unwrap().role, Role::Owner);
    assert_eq!(h.db.chat_count(), 1);
}

#[tokio::test]
async fn test_platform_admin_fallback() {
    let mut config = Config::default();
    config.moderation.platform_admin_fallback = true;
    let h = Harness::with_config(config).await;
    h.db.remove_role(CHAT, OWNER).await.unwrap();

    h.send(OWNER, "+бан 42 1д spam", None).await;
    assert_eq!(h.db.list_active(ActionKind::Ban, CHAT, None).unwrap().len(), 1);
    assert!(matches!(
        h.db.list_active(ActionKind::Ban, CHAT, None).unwrap()[0].state,
        RecordState::Active
    ));
}

#[tokio::test]
async fn test_admin_fallback_follows_reload() {
    let h = Harness::new().await;
    h.db.remove_role(CHAT, OWNER).await.unwrap();

    h.send(OWNER, "+пред 42 флуд", None).await;
    assert!(h.db.list_active(ActionKind::Warn, CHAT, None).unwrap().is_empty());

    let mut reloaded = Config::default();
    reloaded.moderation.platform_admin_fallback = true;
    h.config.update(reloaded);

    h.send(OWNER, "+пред 42 флуд", None).await;
    assert_eq!(h.db.list_active(ActionKind::Warn, CHAT, None).unwrap().len(), 1);
}

#[tokio::test]
async fn test_short_mute_is_enforced_for_the_platform_minimum() {
    let h = Harness::new().await;

    h.send(OWNER, "+мут 10с", Some(TARGET)).await;
    let record = h.db.list_active(ActionKind::Mute, CHAT, Some(TARGET)).unwrap().remove(0);
    assert_eq!(record.until, Some(record.created_at + Duration::seconds(10)));
    assert!(h.platform.calls().contains(&PlatformCall::Restrict {
        chat: CHAT,
        user: TARGET,
        permissions: MemberPermissions::muted(),
        until: Some(record.created_at + MIN_PLATFORM_RESTRICTION),
    }));

    h.send(OWNER, "+бан 5с", Some(TARGET)).await;
    let record = h.db.list_active(ActionKind::Ban, CHAT, Some(TARGET)).unwrap().remove(0);
    assert_eq!(record.until, Some(record.created_at + Duration::seconds(5)));
    assert!(h.platform.calls().contains(&PlatformCall::Ban {
        chat: CHAT,
        user: TARGET,
        until: Some(record.created_at + MIN_PLATFORM_RESTRICTION),
    }));
}

#[tokio::test]
async fn test_oversized_term_is_read_as_reason() {
    let h = Harness::new().await;

    h.send(OWNER, "+бан 300000г", Some(TARGET)).await;
    let record = h.db.list_active(ActionKind::Ban, CHAT, Some(TARGET)).unwrap().remove(0);
    assert_eq!(record.until, None);
    assert_eq!(record.reason.as_deref(), Some("300000г"));
    assert!(h.reply().contains("300000г"));
}

#[tokio::test]
async fn test_plain_chatter_is_ignored() {
    let h = Harness::new().await;

    assert_eq!(h.send(TARGET, "банан очень вкусный", None).await, None);
    assert!(h.platform.calls().is_empty());
}
