// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! Merge order, later wins: compiled defaults, `/etc/outlet/outlet.toml`,
//! `~/.config/outlet/outlet.toml`, `./outlet.toml`, then `OUTLET_*` variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::OutletConfig;

const SECTIONS: &[&str] = &["service", "storage", "gateway", "reply", "notify", "limits"];

/// Candidate config files, lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/etc/outlet/outlet.toml"),
        dirs::config_dir()
            .map(|d| d.join("outlet/outlet.toml"))
            .unwrap_or_default(),
        PathBuf::from("outlet.toml"),
    ]
}

/// Load from the standard hierarchy with env overrides.
pub fn load_config() -> Result<OutletConfig, figment::Error> {
    build_figment().extract()
}

/// Load from an inline string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<OutletConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OutletConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load from an explicit file path with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<OutletConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OutletConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The unextracted figment for the standard hierarchy.
pub fn build_figment() -> Figment {
    config_file_paths().into_iter().fold(
        Figment::new().merge(Serialized::defaults(OutletConfig::default())),
        |figment, path| figment.merge(Toml::file(path)),
    )
    .merge(env_provider())
}

/// `OUTLET_GATEWAY_BEARER_TOKEN` maps to `gateway.bearer_token`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that themselves contain underscores survive intact.
fn env_provider() -> Env {
    Env::prefixed("OUTLET_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("gateway_bearer_token"), "gateway.bearer_token");
        assert_eq!(map_env_key("limits_max_message_chars"), "limits.max_message_chars");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("outlet.toml", "[gateway]\nport = 4000\n")?;
            jail.set_env("OUTLET_GATEWAY_PORT", "4100");
            jail.set_env("OUTLET_REPLY_API_KEY", "k-1");
            let config = load_config_from_path(Path::new("outlet.toml"))?;
            assert_eq!(config.gateway.port, 4100);
            assert_eq!(config.reply.api_key.as_deref(), Some("k-1"));
            Ok(())
        });
    }
}
