// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Outlet support channel.
//!
//! This crate provides the domain types, error kinds, lifecycle and access
//! rules, and the adapter traits used throughout the Outlet workspace. Rules
//! here are pure; storage and transport crates call into them.

pub mod access;
pub mod error;
pub mod lifecycle;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorKind, OutletError};
pub use types::{AdapterType, HealthStatus};

pub use traits::{NotificationSink, PluginAdapter, ReplyProvider, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Storage,
            AdapterType::Reply,
            AdapterType::Notification,
        ];
        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_reply_provider<T: ReplyProvider>() {}
        fn _assert_notification_sink<T: NotificationSink>() {}
    }
}
