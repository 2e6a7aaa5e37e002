// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply generators for the Outlet orchestrator.
//!
//! [`HttpReplyProvider`] calls an external reply service. [`TemplateReplyProvider`]
//! answers locally with fixed supportive text and is used when no endpoint is
//! configured.

pub mod client;
pub mod template;

use std::sync::Arc;

use outlet_config::model::ReplyConfig;
use outlet_core::{OutletError, ReplyProvider};

pub use client::HttpReplyProvider;
pub use template::TemplateReplyProvider;

/// Pick the provider the configuration asks for.
pub fn from_config(config: &ReplyConfig) -> Result<Arc<dyn ReplyProvider>, OutletError> {
    match &config.endpoint {
        Some(_) => Ok(Arc::new(HttpReplyProvider::new(config)?)),
        None => Ok(Arc::new(TemplateReplyProvider::new())),
    }
}

#[cfg(test)]
mod tests {
    use outlet_core::PluginAdapter;

    use super::*;

    #[test]
    fn no_endpoint_selects_template() {
        let provider = from_config(&ReplyConfig::default()).unwrap();
        assert_eq!(provider.name(), "template");
    }

    #[test]
    fn endpoint_selects_http() {
        let config = ReplyConfig {
            endpoint: Some("http://127.0.0.1:9/reply".into()),
            ..ReplyConfig::default()
        };
        assert_eq!(from_config(&config).unwrap().name(), "http");
    }
}
