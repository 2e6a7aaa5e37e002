// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use outlet_config::diagnostic::ConfigError;
use outlet_config::model::NotifySink;
use outlet_config::{load_and_validate_str, load_config_from_str};

#[test]
fn full_file_deserializes() {
    let toml = r#"
[service]
name = "outlet-test"
log_level = "debug"

[storage]
database_path = "/tmp/outlet.db"
wal_mode = false

[gateway]
host = "0.0.0.0"
port = 8088
bearer_token = "gw-token"

[reply]
endpoint = "https://replies.internal/v1/reply"
api_key = "rk-1"
timeout_secs = 5

[notify]
sink = "log"

[limits]
max_message_chars = 1000
max_category_chars = 32
max_reason_chars = 200
max_note_chars = 300
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.service.name, "outlet-test");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/outlet.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 8088);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("gw-token"));
    assert_eq!(
        config.reply.endpoint.as_deref(),
        Some("https://replies.internal/v1/reply")
    );
    assert_eq!(config.reply.timeout_secs, 5);
    assert_eq!(config.notify.sink, NotifySink::Log);
    assert_eq!(config.limits.max_message_chars, 1000);
    assert_eq!(config.limits.max_note_chars, 300);
}

#[test]
fn empty_input_yields_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert_eq!(config.gateway.port, 3180);
    assert_eq!(config.reply.timeout_secs, 20);
    assert_eq!(config.notify.sink, NotifySink::Inbox);
}

#[test]
fn unknown_key_gets_suggestion() {
    let errors = load_and_validate_str("[gateway]\nbearer_tokn = \"x\"\n")
        .expect_err("unknown key must be rejected");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "bearer_tokn" && s == "bearer_token"
        )
    });
    assert!(found, "expected an UnknownKey with suggestion, got {errors:?}");
}

#[test]
fn unknown_section_is_rejected() {
    let err = load_config_from_str("[telemetry]\nenabled = true\n").expect_err("unknown section");
    assert!(err.to_string().contains("telemetry"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").expect_err("bad type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. }) || e.to_string().contains("port")),
        "got {errors:?}"
    );
}

#[test]
fn bad_sink_name_fails() {
    assert!(load_and_validate_str("[notify]\nsink = \"pager\"\n").is_err());
}

#[test]
fn validation_errors_surface_from_str_loader() {
    let errors = load_and_validate_str("[limits]\nmax_message_chars = 0\n").expect_err("zero limit");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}
