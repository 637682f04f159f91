//! Duration tokens (`10m`, `1д`, `2мес`) and remaining-time decomposition

use chrono::{DateTime, Months, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+)(mon|мес|y|г|w|н|d|д|h|ч|m|м|s|с)$")
        .expect("duration pattern is a valid regex")
});

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;

/// Longest accepted offset, in years. Larger tokens are treated as text.
pub const MAX_DURATION_YEARS: u32 = 1000;
const MAX_MONTHS: u32 = MAX_DURATION_YEARS * 12;
const MAX_SECONDS: i64 = MAX_DURATION_YEARS as i64 * 366 * SECONDS_PER_DAY;

/// A parsed expiry offset.
///
/// Month and year units are kept as calendar months so they land on the
/// same day of a later month, clamped to that month's last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOffset {
    /// Seconds, minutes, hours, days or weeks
    Fixed(TimeDelta),
    /// Months; a year is twelve
    Months(u32),
}

impl TimeOffset {
    /// The instant `self` after `from`, or `None` past the representable range
    #[must_use]
    pub fn apply(self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Fixed(delta) => from.checked_add_signed(delta),
            Self::Months(months) => from.checked_add_months(Months::new(months)),
        }
    }
}

/// Parse a `<integer><unit>` token.
///
/// Returns `None` for anything that is not a duration, including zero and
/// values too large to represent, so callers can treat the token as text.
#[must_use]
pub fn parse_duration(token: &str) -> Option<TimeOffset> {
    let captures = DURATION_PATTERN.captures(token)?;
    let amount: i64 = captures[1].parse().ok()?;
    if amount == 0 {
        return None;
    }

    let unit = captures[2].to_lowercase();
    let seconds_per_unit = match unit.as_str() {
        "s" | "с" => 1,
        "m" | "м" => SECONDS_PER_MINUTE,
        "h" | "ч" => SECONDS_PER_HOUR,
        "d" | "д" => SECONDS_PER_DAY,
        "w" | "н" => SECONDS_PER_WEEK,
        "mon" | "мес" => return months(amount, 1),
        "y" | "г" => return months(amount, 12),
        _ => return None,
    };

    amount
        .checked_mul(seconds_per_unit)
        .filter(|seconds| *seconds <= MAX_SECONDS)
        .and_then(TimeDelta::try_seconds)
        .map(TimeOffset::Fixed)
}

fn months(amount: i64, per_unit: u32) -> Option<TimeOffset> {
    u32::try_from(amount)
        .ok()
        .and_then(|n| n.checked_mul(per_unit))
        .filter(|months| *months <= MAX_MONTHS)
        .map(TimeOffset::Months)
}

/// Time left until an expiry, truncated to whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    /// The expiry is now or in the past
    Expired,
    /// Time still left
    Left {
        /// Whole days
        days: i64,
        /// Hours past the days
        hours: i64,
        /// Minutes past the hours
        minutes: i64,
        /// Seconds past the minutes
        seconds: i64,
    },
}

impl Remaining {
    /// Decompose the span between `now` and `until`
    #[must_use]
    pub fn between(until: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (until - now).num_seconds();
        if total <= 0 {
            return Self::Expired;
        }
        Self::Left {
            days: total / SECONDS_PER_DAY,
            hours: total % SECONDS_PER_DAY / SECONDS_PER_HOUR,
            minutes: total % SECONDS_PER_HOUR / SECONDS_PER_MINUTE,
            seconds: total % SECONDS_PER_MINUTE,
        }
    }

    /// Render as e.g. `2д 3ч 15м`; seconds only appear when nothing larger does
    #[must_use]
    pub fn render(&self, labels: &UnitLabels) -> String {
        let Self::Left {
            days,
            hours,
            minutes,
            seconds,
        } = *self
        else {
            return labels.expired.clone();
        };

        let mut parts = Vec::with_capacity(3);
        for (value, label) in [(days, &labels.day), (hours, &labels.hour), (minutes, &labels.minute)] {
            if value > 0 {
                parts.push(format!("{value}{label}"));
            }
        }
        if parts.is_empty() {
            parts.push(format!("{seconds}{}", labels.second));
        }
        parts.join(" ")
    }
}

/// Localised unit suffixes for [`Remaining::render`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitLabels {
    /// Day suffix
    pub day: String,
    /// Hour suffix
    pub hour: String,
    /// Minute suffix
    pub minute: String,
    /// Second suffix
    pub second: String,
    /// Text for an elapsed expiry
    pub expired: String,
}

impl UnitLabels {
    /// Russian suffixes, matching the default locale
    #[must_use]
    pub fn russian() -> Self {
        Self {
            day: "д".to_string(),
            hour: "ч".to_string(),
            minute: "м".to_string(),
            second: "с".to_string(),
            expired: "закончено".to_string(),
        }
    }
}
