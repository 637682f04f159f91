//! Duration and reason extraction for warn, mute and ban commands

use crate::duration::{parse_duration, TimeOffset};

/// Expiry and reason of a grant command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GrantArgs {
    /// Parsed expiry offset
    pub duration: Option<TimeOffset>,
    /// Free-text reason
    pub reason: Option<String>,
}

fn split_first(args: &str) -> Option<(&str, Option<&str>)> {
    let args = args.trim();
    if args.is_empty() {
        return None;
    }
    match args.split_once(char::is_whitespace) {
        Some((first, rest)) => {
            let rest = rest.trim();
            Some((first, (!rest.is_empty()).then_some(rest)))
        }
        None => Some((args, None)),
    }
}

/// Extract duration and reason from the text after the command word.
///
/// The text is split into a first token and an unsplit remainder.
///
/// As a reply, a first token that parses as a duration is the expiry and the
/// remainder is the reason; otherwise the whole text is the reason.
///
/// With an explicit target, the first token is the target. The remainder is
/// tried as a duration; failing that the first token is, with the remainder
/// as reason; failing both the remainder is the reason.
///
/// Returns `None` when there is neither a reply nor a target token.
#[must_use]
pub fn parse_grant_args(args: &str, is_reply: bool) -> Option<GrantArgs> {
    let Some((first, rest)) = split_first(args) else {
        return is_reply.then(GrantArgs::default);
    };

    if is_reply {
        return Some(match parse_duration(first) {
            Some(duration) => GrantArgs {
                duration: Some(duration),
                reason: rest.map(str::to_string),
            },
            None => GrantArgs {
                duration: None,
                reason: Some(rest.map_or_else(|| first.to_string(), |rest| format!("{first} {rest}"))),
            },
        });
    }

    let Some(rest) = rest else {
        return Some(GrantArgs::default());
    };

    if let Some(duration) = parse_duration(rest) {
        return Some(GrantArgs {
            duration: Some(duration),
            reason: None,
        });
    }

    Some(GrantArgs {
        duration: parse_duration(first),
        reason: Some(rest.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn minutes(n: i64) -> Option<TimeOffset> {
        Some(TimeOffset::Fixed(TimeDelta::minutes(n)))
    }

    #[test]
    fn test_reply_duration_then_reason() {
        assert_eq!(
            parse_grant_args("10м spam", true),
            Some(GrantArgs {
                duration: minutes(10),
                reason: Some("spam".to_string())
            })
        );
        assert_eq!(
            parse_grant_args("10m   flood in chat", true),
            Some(GrantArgs {
                duration: minutes(10),
                reason: Some("flood in chat".to_string())
            })
        );
    }

    #[test]
    fn test_reply_without_duration_is_all_reason() {
        assert_eq!(
            parse_grant_args("spam again", true),
            Some(GrantArgs {
                duration: None,
                reason: Some("spam again".to_string())
            })
        );
    }

    #[test]
    fn test_bare_reply() {
        assert_eq!(parse_grant_args("", true), Some(GrantArgs::default()));
        assert_eq!(
            parse_grant_args("1ч", true),
            Some(GrantArgs {
                duration: Some(TimeOffset::Fixed(TimeDelta::hours(1))),
                reason: None
            })
        );
    }

    #[test]
    fn test_explicit_target_remainder_duration() {
        assert_eq!(
            parse_grant_args("42 10м", false),
            Some(GrantArgs {
                duration: minutes(10),
                reason: None
            })
        );
    }

    #[test]
    fn test_explicit_target_remainder_is_reason() {
        // The target token occupies the first slot, so a duration followed by
        // a reason stays in the unsplit remainder and is read as reason.
        assert_eq!(
            parse_grant_args("42 10м spam", false),
            Some(GrantArgs {
                duration: None,
                reason: Some("10м spam".to_string())
            })
        );
    }

    #[test]
    fn test_explicit_duration_first() {
        assert_eq!(
            parse_grant_args("10м spam", false),
            Some(GrantArgs {
                duration: minutes(10),
                reason: Some("spam".to_string())
            })
        );
    }

    #[test]
    fn test_target_only_and_usage() {
        assert_eq!(parse_grant_args("42", false), Some(GrantArgs::default()));
        assert_eq!(parse_grant_args("", false), None);
        assert_eq!(parse_grant_args("   ", false), None);
    }
}
