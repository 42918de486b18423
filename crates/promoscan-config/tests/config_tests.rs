// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Promoscan configuration system.

use promoscan_config::model::PromoscanConfig;
use promoscan_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_promoscan_config() {
    let toml = r#"
[harvest]
keywords = ["sale", "скидка"]
description_max_len = 80
output_path = "/tmp/promotions.json"
checkpoint_path = "/tmp/checkpoints.json"
media_dir = "/tmp/media"
redownload_media = false
log_level = "debug"

[mail]
host = "imap.example.com"
port = 993
username = "promo@example.com"
password = "hunter2"
folder = "Promotions"
lookback_count = 25
body_limit = 300

[telegram]
gateway_url = "https://gateway.example.com"
api_token = "tok-123"
channels = ["kpcosm", "geltek_skincare"]
lookback_days = 14
page_size = 50

[pacing]
message_delay_min_secs = 0.5
message_delay_max_secs = 1.5
source_delay_min_secs = 1.0
source_delay_max_secs = 2.0
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.harvest.keywords, vec!["sale", "скидка"]);
    assert_eq!(config.harvest.description_max_len, 80);
    assert!(!config.harvest.redownload_media);
    assert_eq!(config.harvest.log_level, "debug");
    assert_eq!(config.mail.host.as_deref(), Some("imap.example.com"));
    assert_eq!(config.mail.folder, "Promotions");
    assert_eq!(config.mail.lookback_count, 25);
    assert_eq!(config.mail.body_limit, 300);
    assert_eq!(config.telegram.channels, vec!["kpcosm", "geltek_skincare"]);
    assert_eq!(config.telegram.lookback_days, 14);
    assert_eq!(config.pacing.message_delay_max_secs, 1.5);
}

/// Missing sections fall back to compiled defaults without error.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("defaults should apply");
    let defaults = PromoscanConfig::default();
    assert_eq!(config.harvest.keywords, defaults.harvest.keywords);
    assert_eq!(config.harvest.keywords.len(), 20);
    assert_eq!(config.harvest.description_max_len, 100);
    assert_eq!(config.mail.port, 993);
    assert_eq!(config.mail.lookback_count, 50);
    assert_eq!(config.mail.body_limit, 500);
    assert_eq!(config.telegram.lookback_days, 30);
    assert!(config.telegram.channels.is_empty());
    assert!(!config.mail.enabled());
    assert!(!config.telegram.enabled());
}

/// Unknown field in a section is rejected by deny_unknown_fields.
#[test]
fn unknown_field_in_harvest_produces_error() {
    let toml = r#"
[harvest]
keywrods = ["sale"]
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("keywrods"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// load_and_validate_str surfaces semantic validation errors.
#[test]
fn validation_errors_surface_through_load_and_validate() {
    let toml = r#"
[mail]
host = "imap.example.com"
"#;

    let errors = load_and_validate_str(toml).expect_err("missing credentials should fail");
    let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert!(rendered.iter().any(|m| m.contains("mail.username")));
}

/// A wrong-typed value is reported with its dotted key path.
#[test]
fn wrong_type_is_rejected() {
    let toml = r#"
[telegram]
lookback_days = "thirty"
"#;

    let err = load_config_from_str(toml).expect_err("string where integer expected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("expected"),
        "got: {err_str}"
    );
}

/// Defaults pass validation end to end.
#[test]
fn defaults_validate_cleanly() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.harvest.output_path, "promotions.json");
}
