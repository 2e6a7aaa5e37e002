// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::OutletConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate every section, collecting all failures instead of stopping at the first.
pub fn validate_config(config: &OutletConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "service.log_level `{}` must be one of {}",
            config.service.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation("storage.database_path must not be empty"));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if config.gateway.port == 0 {
        errors.push(ConfigError::validation("gateway.port must not be 0"));
    }

    if config
        .gateway
        .bearer_token
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        errors.push(ConfigError::validation(
            "gateway.bearer_token must not be blank; omit it to reject all requests",
        ));
    }

    if let Some(endpoint) = &config.reply.endpoint
        && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        errors.push(ConfigError::validation(format!(
            "reply.endpoint `{endpoint}` must start with http:// or https://"
        )));
    }

    if config.reply.timeout_secs == 0 {
        errors.push(ConfigError::validation("reply.timeout_secs must be at least 1"));
    }

    let limits = [
        ("max_message_chars", config.limits.max_message_chars),
        ("max_category_chars", config.limits.max_category_chars),
        ("max_reason_chars", config.limits.max_reason_chars),
        ("max_note_chars", config.limits.max_note_chars),
    ];
    for (name, value) in limits {
        if value == 0 {
            errors.push(ConfigError::validation(format!(
                "limits.{name} must be at least 1"
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
