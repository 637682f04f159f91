//! Countdown to the next January 1st

use crate::context::CommandContext;
use crate::error::CommandResult;
use chrono::{DateTime, Datelike, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use woxl_i18n::fluent_args;
use woxl_moderation::IncomingMessage;

/// Time left until midnight of January 1st of the next year in `zone`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Whole days
    pub days: i64,
    /// Hours within the day
    pub hours: i64,
    /// Minutes within the hour
    pub minutes: i64,
    /// Seconds within the minute
    pub seconds: i64,
}

impl Countdown {
    /// `None` only if the zone has no midnight on January 1st
    #[must_use]
    pub fn until_new_year(now: DateTime<Utc>, zone: Tz) -> Option<Self> {
        let year = now.with_timezone(&zone).year() + 1;
        let midnight = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
        let target = match zone.from_local_datetime(&midnight) {
            LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t,
            LocalResult::None => return None,
        };

        let total = (target.with_timezone(&Utc) - now).num_seconds().max(0);
        Some(Self {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        })
    }
}

/// `нг`, `до нг`, `до нового года`
pub async fn countdown(ctx: &CommandContext, message: &IncomingMessage) -> CommandResult<()> {
    let zone = ctx.settings().zone();
    let Some(left) = Countdown::until_new_year(Utc::now(), zone) else {
        return Ok(());
    };

    let args = fluent_args![
        "days" => left.days,
        "hours" => format!("{:02}", left.hours),
        "minutes" => format!("{:02}", left.minutes),
        "seconds" => format!("{:02}", left.seconds),
        "zone" => zone.name(),
    ];
    ctx.platform
        .send_message(message.chat_id, &ctx.t("newyear-countdown", args.as_ref()), None, None)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use woxl_common::test_utils::mock_timestamp;

    #[test]
    fn test_countdown_in_moscow() {
        // 20:00 UTC on Dec 31 is 23:00 in Moscow
        let now = mock_timestamp(2025, 12, 31, 20, 0, 0);
        let left = Countdown::until_new_year(now, chrono_tz::Europe::Moscow).unwrap();
        assert_eq!(
            left,
            Countdown {
                days: 0,
                hours: 1,
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn test_countdown_after_local_midnight() {
        // 22:30 UTC on Dec 31 is already Jan 1 in Moscow
        let now = mock_timestamp(2025, 12, 31, 22, 30, 0);
        let left = Countdown::until_new_year(now, chrono_tz::Europe::Moscow).unwrap();
        assert_eq!(left.days, 364);
        assert_eq!((left.hours, left.minutes), (22, 30));
    }
}
