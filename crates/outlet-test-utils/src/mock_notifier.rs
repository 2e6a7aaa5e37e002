// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sink that records every notice for assertions.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use outlet_core::types::{AdapterType, HealthStatus, Notification, NotificationKind};
use outlet_core::{NotificationSink, OutletError, PluginAdapter};

#[derive(Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every notice with an `Internal` error. Rejected notices are not recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.received.lock().await.clone()
    }

    pub async fn of_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.received
            .lock()
            .await
            .iter()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PluginAdapter for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notification
    }

    async fn health_check(&self) -> Result<HealthStatus, OutletError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OutletError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), OutletError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(OutletError::Internal("inbox unavailable".into()));
        }
        self.received.lock().await.push(notification.clone());
        Ok(())
    }
}
