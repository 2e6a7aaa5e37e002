// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sink for the staff and owner inbox.

use async_trait::async_trait;

use crate::error::OutletError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Notification;

/// Receives escalation and resolution notices.
///
/// Delivery durability is the sink's concern. Callers treat a notice as
/// fire-and-forget and only log failures.
#[async_trait]
pub trait NotificationSink: PluginAdapter {
    async fn notify(&self, notification: &Notification) -> Result<(), OutletError>;
}
