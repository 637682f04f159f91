//! Checks that both bundled locales define the same messages and that the
//! messages other crates look up by constructed key are present.

use fluent_syntax::ast::Entry;
use fluent_syntax::parser::parse;
use std::collections::BTreeSet;
use woxl_i18n::{fluent_args, resource::embedded_source, I18nManager, Locale};

fn keys_of(locale: Locale) -> BTreeSet<String> {
    let resource = parse(embedded_source(locale)).expect("bundled resource parses");
    resource
        .body
        .iter()
        .filter_map(|entry| match entry {
            Entry::Message(message) => Some(message.id.name.to_string()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_locales_define_identical_keys() {
    assert_eq!(keys_of(Locale::Russian), keys_of(Locale::English));
}

#[test]
fn test_role_and_unit_keys_present() {
    let manager = I18nManager::new(Locale::Russian).unwrap();
    let keys = [
        "role-owner",
        "role-administrator",
        "role-senior-moderator",
        "role-moderator",
        "role-junior-moderator",
        "unit-day",
        "unit-hour",
        "unit-minute",
        "unit-second",
        "unit-expired",
    ];
    for locale in Locale::all() {
        for key in keys {
            assert!(manager.has_message(key, &locale), "{key} missing in {locale:?}");
        }
    }
}

#[test]
fn test_action_prefixed_keys_present() {
    let manager = I18nManager::new(Locale::Russian).unwrap();
    for kind in ["warn", "mute", "ban"] {
        for suffix in [
            "usage",
            "denied-grant",
            "denied-revoke",
            "granted",
            "revoked",
            "none-active",
        ] {
            let key = format!("{kind}-{suffix}");
            assert!(manager.has_message(&key, &Locale::English), "{key} missing");
        }
    }
}

#[test]
fn test_list_row_renders() {
    let manager = I18nManager::new(Locale::Russian).unwrap();
    let args = fluent_args![
        "index" => 1,
        "user" => "U",
        "reason" => "спам",
        "remaining" => "1м",
        "issuer" => "Система",
        "created" => "01.01.2025 00:30",
    ];
    assert_eq!(
        manager.t("list-row", args.as_ref()),
        "│   1. U — <b>за</b>: спам; <b>до</b>: (1м); <b>выдал</b>: Система 01.01.2025 00:30"
    );
}
