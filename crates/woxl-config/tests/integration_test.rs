//! End-to-end configuration loading tests.

use std::io::Write;
use tempfile::NamedTempFile;
use woxl_common::UserId;
use woxl_config::{ConfigCache, ConfigError, ConfigLoader, ConfigValidator};

#[test]
fn test_file_then_overrides_then_validation() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[telegram]\ntoken = \"123:abc\"\n\n[bot]\ncreator_ids = [7]\ntimezone = \"Asia/Yekaterinburg\"\n"
    )
    .unwrap();

    let content = std::fs::read_to_string(file.path()).unwrap();
    let mut config = ConfigLoader::parse_str(&content).unwrap();
    ConfigLoader::apply_overrides_from(&mut config, |var| {
        (var == "CREATOR_IDS").then(|| "7,8".to_string())
    })
    .unwrap();
    ConfigValidator::validate(&config).unwrap();

    assert!(config.bot.is_creator(UserId(8)));
    assert_eq!(config.zone(), chrono_tz::Asia::Yekaterinburg);
}

#[test]
fn test_validation_failure_surfaces_field() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[telegram]\ntoken = \"x\"\n\n[bot]\nlocale = \"fr\"\n").unwrap();

    let err = ConfigLoader::load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "bot.locale"));
}

#[test]
fn test_cache_reload_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[telegram]\ntoken = \"x\"\n\n[moderation]\npage_size = 4\n").unwrap();

    let cache = ConfigCache::default();
    cache.reload(Some(file.path())).unwrap();
    assert_eq!(cache.get().moderation.page_size, 4);
}
