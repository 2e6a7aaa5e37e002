// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Outlet collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod notify;
pub mod reply;
pub mod storage;

pub use adapter::PluginAdapter;
pub use notify::NotificationSink;
pub use reply::ReplyProvider;
pub use storage::StorageAdapter;
