// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a mistyped key is a
//! startup error instead of a silently ignored setting.

use serde::{Deserialize, Serialize};

/// Top-level Outlet configuration.
///
/// Every section is optional and defaults to values suitable for a local run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutletConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Reply-generation collaborator.
    #[serde(default)]
    pub reply: ReplyConfig,

    /// Notification sink selection.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Input size limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Service identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "outlet".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("outlet").join("outlet.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("outlet.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token expected from the upstream authenticator.
    /// `None` rejects every authenticated request.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3180
}

/// Reply-generation collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyConfig {
    /// URL of the reply service. `None` uses the built-in template replies.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer key sent to the reply service.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_reply_timeout")]
    pub timeout_secs: u64,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_reply_timeout(),
        }
    }
}

fn default_reply_timeout() -> u64 {
    20
}

/// Where escalation and resolution notices go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifySink {
    /// Persist to the inbox table in storage.
    #[default]
    Inbox,
    /// Emit as structured log lines only.
    Log,
}

/// Notification configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    #[serde(default)]
    pub sink: NotifySink,
}

/// Input size limits, counted in characters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    #[serde(default = "default_max_category_chars")]
    pub max_category_chars: usize,

    #[serde(default = "default_max_reason_chars")]
    pub max_reason_chars: usize,

    #[serde(default = "default_max_note_chars")]
    pub max_note_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            max_category_chars: default_max_category_chars(),
            max_reason_chars: default_max_reason_chars(),
            max_note_chars: default_max_note_chars(),
        }
    }
}

fn default_max_message_chars() -> usize {
    4000
}

fn default_max_category_chars() -> usize {
    64
}

fn default_max_reason_chars() -> usize {
    500
}

fn default_max_note_chars() -> usize {
    2000
}

impl OutletConfig {
    /// Render as TOML with secrets replaced.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut redacted = self.clone();
        if redacted.gateway.bearer_token.is_some() {
            redacted.gateway.bearer_token = Some("[redacted]".to_string());
        }
        if redacted.reply.api_key.is_some() {
            redacted.reply.api_key = Some("[redacted]".to_string());
        }
        toml::to_string_pretty(&redacted)
    }
}
