//! Text triggers of chat commands
//!
//! Triggers are case-insensitive prefixes that must be followed by
//! whitespace or the end of the text. Longer triggers are tried first, so
//! `мут лист` is a list request and `снять роль` is not a warning revocation.

use once_cell::sync::Lazy;
use woxl_common::ActionKind;

/// A recognised chat command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Issue a warning, mute or ban
    Grant(ActionKind),
    /// Revoke the newest active record
    Revoke(ActionKind),
    /// Paginated list of active records
    List(ActionKind),
    /// Remove a member without a record
    Kick,
    /// Staff list grouped by role
    Staff,
    /// Set a role by name or level
    AssignRole,
    /// Delete a role
    RemoveRole,
    /// Raise a role by one level
    Promote,
    /// Lower a role by one level
    Demote,
    /// `+ник name`
    SetNick,
    /// `-ник`
    DeleteNick,
    /// `?ник`
    ShowNick,
    /// Bare `ник`: sets with an argument, shows without
    Nick,
    /// `/start`
    Start,
    /// Latency and diagnostics
    Ping,
    /// Relay a message to another chat
    Raven,
    /// Countdown to the new year
    NewYear,
}

struct Trigger {
    text: &'static str,
    command: Command,
    exact: bool,
}

const fn prefix(text: &'static str, command: Command) -> Trigger {
    Trigger {
        text,
        command,
        exact: false,
    }
}

const fn exact(text: &'static str, command: Command) -> Trigger {
    Trigger {
        text,
        command,
        exact: true,
    }
}

static TRIGGERS: Lazy<Vec<Trigger>> = Lazy::new(|| {
    use ActionKind::{Ban, Mute, Warn};
    use Command::*;

    let mut triggers = vec![
        // Warnings
        prefix("варн", Grant(Warn)),
        prefix("+варн", Grant(Warn)),
        prefix("пред", Grant(Warn)),
        prefix("+пред", Grant(Warn)),
        prefix("warn", Grant(Warn)),
        prefix("+warn", Grant(Warn)),
        prefix("-варн", Revoke(Warn)),
        prefix("-пред", Revoke(Warn)),
        prefix("снять", Revoke(Warn)),
        prefix("unwarn", Revoke(Warn)),
        prefix("-warn", Revoke(Warn)),
        prefix("?пред", List(Warn)),
        prefix("?варн", List(Warn)),
        prefix("warns", List(Warn)),
        prefix("?warn", List(Warn)),
        // Mutes
        prefix("мут", Grant(Mute)),
        prefix("+мут", Grant(Mute)),
        prefix("замутить", Grant(Mute)),
        prefix("+замутить", Grant(Mute)),
        prefix("mute", Grant(Mute)),
        prefix("+mute", Grant(Mute)),
        prefix("-мут", Revoke(Mute)),
        prefix("размут", Revoke(Mute)),
        prefix("размутить", Revoke(Mute)),
        prefix("unmute", Revoke(Mute)),
        prefix("-mute", Revoke(Mute)),
        prefix("мутлист", List(Mute)),
        prefix("муты", List(Mute)),
        prefix("мут лист", List(Mute)),
        prefix("mutelist", List(Mute)),
        prefix("/мутлист", List(Mute)),
        prefix("/mutelist", List(Mute)),
        prefix("?mute", List(Mute)),
        prefix("?мут", List(Mute)),
        // Bans
        prefix("бан", Grant(Ban)),
        prefix("+бан", Grant(Ban)),
        prefix("ban", Grant(Ban)),
        prefix("+ban", Grant(Ban)),
        prefix("-бан", Revoke(Ban)),
        prefix("разбан", Revoke(Ban)),
        prefix("разблокировать", Revoke(Ban)),
        prefix("unban", Revoke(Ban)),
        prefix("-unban", Revoke(Ban)),
        prefix("-ban", Revoke(Ban)),
        prefix("список банов", List(Ban)),
        prefix("бан лист", List(Ban)),
        prefix("банлист", List(Ban)),
        prefix("banlist", List(Ban)),
        prefix("ban list", List(Ban)),
        prefix("?баны", List(Ban)),
        // Kick
        prefix("кик", Kick),
        prefix("+кик", Kick),
        prefix("кикнуть", Kick),
        prefix("kick", Kick),
        prefix("+kick", Kick),
        prefix("kicked", Kick),
        // Roles
        prefix("?админ", Staff),
        prefix("?админы", Staff),
        prefix("админы", Staff),
        prefix("admins", Staff),
        prefix("/staff", Staff),
        prefix("/admins", Staff),
        prefix("список администрации", Staff),
        prefix("назначить", AssignRole),
        prefix("+назначить", AssignRole),
        prefix("!назначить", AssignRole),
        prefix("/назначить", AssignRole),
        prefix("setrole", AssignRole),
        prefix("+setrole", AssignRole),
        prefix("!setrole", AssignRole),
        prefix("/setrole", AssignRole),
        prefix("снять роль", RemoveRole),
        prefix("разжаловать", RemoveRole),
        prefix("unrole", RemoveRole),
        prefix("/unrole", RemoveRole),
        prefix("-роль", RemoveRole),
        prefix("повысить", Promote),
        prefix("+повысить", Promote),
        prefix("promote", Promote),
        prefix("/promote", Promote),
        prefix("понизить", Demote),
        prefix("-понизить", Demote),
        prefix("demote", Demote),
        prefix("/demote", Demote),
        // Nicknames
        prefix("+ник", SetNick),
        prefix("-ник", DeleteNick),
        prefix("?ник", ShowNick),
        prefix("ник", Nick),
        // Glue
        prefix("/start", Start),
        prefix("ping", Ping),
        exact("пинг", Ping),
        prefix("/ping", Ping),
        prefix("/send_raven_bot", Raven),
        exact("нг", NewYear),
        exact("до нг", NewYear),
        exact("до нового года", NewYear),
    ];

    triggers.sort_by_key(|t| std::cmp::Reverse(t.text.chars().count()));
    triggers
});

/// A matched command and the original text after its trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched<'a> {
    /// The command
    pub command: Command,
    /// Text after the trigger, trimmed, original case
    pub args: &'a str,
}

/// Strip an `@botname` suffix from a leading slash command.
///
/// Returns `None` when the command is addressed to a different bot.
fn strip_bot_suffix(text: &str, bot_username: Option<&str>) -> Option<String> {
    if !text.starts_with('/') {
        return Some(text.to_string());
    }
    let (word, rest) = text
        .split_once(char::is_whitespace)
        .map_or((text, ""), |(w, r)| (w, r));
    let Some((command, addressee)) = word.split_once('@') else {
        return Some(text.to_string());
    };
    if let Some(username) = bot_username {
        if !addressee.eq_ignore_ascii_case(username.trim_start_matches('@')) {
            return None;
        }
    }
    Some(if rest.is_empty() {
        command.to_string()
    } else {
        format!("{command} {rest}")
    })
}

/// Byte offset after the first `chars` characters of `text`
fn char_boundary(text: &str, chars: usize) -> Option<usize> {
    if chars == 0 {
        return Some(0);
    }
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .or_else(|| (text.chars().count() == chars).then_some(text.len()))
}

fn match_normalized(text: &str) -> Option<Matched<'_>> {
    let text = text.trim();
    TRIGGERS.iter().find_map(|trigger| {
        let end = char_boundary(text, trigger.text.chars().count())?;
        if text[..end].to_lowercase() != trigger.text {
            return None;
        }
        let rest = &text[end..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let args = rest.trim();
        if trigger.exact && !args.is_empty() {
            return None;
        }
        Some(Matched {
            command: trigger.command,
            args,
        })
    })
}

/// Normalised message text ready for matching.
///
/// Keeps the owned text alive while a [`Matched`] borrows from it.
#[derive(Debug, Clone)]
pub struct CommandText(String);

impl CommandText {
    /// Normalise `text`; `None` for slash commands meant for another bot
    #[must_use]
    pub fn new(text: &str, bot_username: Option<&str>) -> Option<Self> {
        strip_bot_suffix(text.trim(), bot_username).map(Self)
    }

    /// Match against the trigger table
    #[must_use]
    pub fn matched(&self) -> Option<Matched<'_>> {
        match_normalized(&self.0)
    }
}

/// Match `text` directly, without bot-suffix handling
#[must_use]
pub fn match_command(text: &str) -> Option<Matched<'_>> {
    match_normalized(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(text: &str) -> Option<Command> {
        match_command(text).map(|m| m.command)
    }

    #[test]
    fn test_grant_revoke_list() {
        assert_eq!(command("+мут 10м spam"), Some(Command::Grant(ActionKind::Mute)));
        assert_eq!(command("МУТ"), Some(Command::Grant(ActionKind::Mute)));
        assert_eq!(command("-мут"), Some(Command::Revoke(ActionKind::Mute)));
        assert_eq!(command("размут 42"), Some(Command::Revoke(ActionKind::Mute)));
        assert_eq!(command("мут лист 2"), Some(Command::List(ActionKind::Mute)));
        assert_eq!(command("муты"), Some(Command::List(ActionKind::Mute)));
        assert_eq!(command("?пред"), Some(Command::List(ActionKind::Warn)));
        assert_eq!(command("бан лист"), Some(Command::List(ActionKind::Ban)));
        assert_eq!(command("Список банов"), Some(Command::List(ActionKind::Ban)));
        assert_eq!(command("-ban 5"), Some(Command::Revoke(ActionKind::Ban)));
    }

    #[test]
    fn test_word_boundary() {
        assert_eq!(command("мутация"), None);
        assert_eq!(command("банан"), None);
        assert_eq!(command("warning"), None);
        assert_eq!(command("кикнуть 5"), Some(Command::Kick));
    }

    #[test]
    fn test_longest_trigger_wins() {
        assert_eq!(command("снять роль 42"), Some(Command::RemoveRole));
        assert_eq!(command("снять 42"), Some(Command::Revoke(ActionKind::Warn)));
        assert_eq!(command("?админы"), Some(Command::Staff));
    }

    #[test]
    fn test_args_keep_case() {
        let matched = match_command("+ПРЕД 10м Флуд В Чате").unwrap();
        assert_eq!(matched.args, "10м Флуд В Чате");
    }

    #[test]
    fn test_exact_triggers() {
        assert_eq!(command("нг"), Some(Command::NewYear));
        assert_eq!(command("До нового года"), Some(Command::NewYear));
        assert_eq!(command("нг скоро"), None);
        assert_eq!(command("пинг"), Some(Command::Ping));
        assert_eq!(command("ping chat"), Some(Command::Ping));
    }

    #[test]
    fn test_nick_variants() {
        assert_eq!(command("+ник Вокс"), Some(Command::SetNick));
        assert_eq!(command("-ник"), Some(Command::DeleteNick));
        assert_eq!(command("?ник 42"), Some(Command::ShowNick));
        assert_eq!(command("ник"), Some(Command::Nick));
        assert_eq!(command("никнейм"), None);
    }

    #[test]
    fn test_bot_suffix() {
        let text = CommandText::new("/start@Woxl_Bot", Some("woxl_bot")).unwrap();
        assert_eq!(text.matched().unwrap().command, Command::Start);

        let text = CommandText::new("/admins@woxl_bot now", Some("woxl_bot")).unwrap();
        assert_eq!(text.matched().unwrap().args, "now");

        assert!(CommandText::new("/start@other_bot", Some("woxl_bot")).is_none());
    }

    #[test]
    fn test_plain_text_is_ignored() {
        assert_eq!(command("привет всем"), None);
        assert_eq!(command(""), None);
    }
}
