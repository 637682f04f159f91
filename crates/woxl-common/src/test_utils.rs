//! Test utilities and shared test helpers.
//!
//! Available to other crates through the `testing` feature.

use crate::{ChatId, UserId};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call multiple times.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt()
            .with_test_writer()
            .with_env_filter(filter)
            .try_init();
    });
}

/// Test fixture for creating a fixed timestamp.
pub fn mock_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Telegram-shaped identifiers used across test suites.
pub mod fixtures {
    use super::{ChatId, UserId};

    /// A supergroup id.
    pub const fn test_chat_id() -> ChatId {
        ChatId(-1_001_234_567_890)
    }

    /// The chat owner.
    pub const fn owner_id() -> UserId {
        UserId(1_000)
    }

    /// An ordinary member.
    pub const fn member_id() -> UserId {
        UserId(42)
    }

    /// Several distinct member ids.
    pub fn member_ids(count: usize) -> Vec<UserId> {
        (0..count)
            .map(|i| UserId(5_000 + i64::try_from(i).unwrap_or(0)))
            .collect()
    }
}

/// Property-based testing strategies.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use crate::{Role, UserId};
    use proptest::prelude::*;

    /// Strategy for positive Telegram user ids.
    pub fn user_id_strategy() -> impl Strategy<Value = UserId> {
        (1i64..=9_999_999_999i64).prop_map(UserId)
    }

    /// Strategy for any assignable role.
    pub fn role_strategy() -> impl Strategy<Value = Role> {
        (1u8..=5u8).prop_map(|level| Role::from_level(level).unwrap())
    }
}
