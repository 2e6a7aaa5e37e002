// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sinks and the notices the orchestrator emits.
//!
//! Notices carry ids, roles and reasons. Message text never goes into one.

use std::sync::Arc;

use async_trait::async_trait;
use outlet_config::model::NotifySink;
use outlet_core::types::{
    AdapterType, HealthStatus, Notification, NotificationKind, OutletEscalation, OutletSession,
    Severity, new_id, now_timestamp,
};
use outlet_core::{NotificationSink, OutletError, PluginAdapter, StorageAdapter};
use tracing::info;

/// Notice for a new ledger entry. Addressed to the assignee, or to the whole
/// role when unassigned.
pub fn escalation_notice(session: &OutletSession, entry: &OutletEscalation) -> Notification {
    let (title, severity) = if entry.is_auto_flag() {
        ("Support session flagged for review", Severity::Critical)
    } else {
        ("Support session escalated", Severity::Warning)
    };
    let mut body = format!(
        "Session {} was escalated to {}.",
        session.id, entry.escalated_to_role
    );
    if let Some(reason) = entry.reason.as_deref() {
        body.push_str(&format!(" Reason: {reason}."));
    }
    Notification {
        id: new_id(),
        org_id: session.org_id.clone(),
        user_id: entry.assigned_to_user_id.clone(),
        kind: NotificationKind::OutletEscalation,
        title: title.to_string(),
        body,
        severity,
        session_id: session.id.clone(),
        created_at: now_timestamp(),
    }
}

/// Notice to the owner that staff resolved their session.
pub fn resolution_notice(session: &OutletSession) -> Notification {
    Notification {
        id: new_id(),
        org_id: session.org_id.clone(),
        user_id: Some(session.user_id.clone()),
        kind: NotificationKind::OutletResolved,
        title: "Your support session was resolved".to_string(),
        body: format!("Session {} has been marked resolved by staff.", session.id),
        severity: Severity::Info,
        session_id: session.id.clone(),
        created_at: now_timestamp(),
    }
}

/// Build the sink the configuration selects.
pub fn from_config(sink: NotifySink, storage: Arc<dyn StorageAdapter>) -> Arc<dyn NotificationSink> {
    match sink {
        NotifySink::Inbox => Arc::new(InboxNotifier::new(storage)),
        NotifySink::Log => Arc::new(LogNotifier),
    }
}

/// Writes notices as structured log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl PluginAdapter for LogNotifier {
    fn name(&self) -> &str {
        "log"
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
impl NotificationSink for LogNotifier {
    async fn notify(&self, n: &Notification) -> Result<(), OutletError> {
        info!(
            notification_id = %n.id,
            org_id = %n.org_id,
            user_id = n.user_id.as_deref().unwrap_or("-"),
            kind = %n.kind,
            severity = %n.severity,
            session_id = %n.session_id,
            title = %n.title,
            "notification"
        );
        Ok(())
    }
}

/// Persists notices to the storage inbox table.
pub struct InboxNotifier {
    storage: Arc<dyn StorageAdapter>,
}

impl InboxNotifier {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl PluginAdapter for InboxNotifier {
    fn name(&self) -> &str {
        "inbox"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notification
    }

    async fn health_check(&self) -> Result<HealthStatus, OutletError> {
        self.storage.health_check().await
    }

    async fn shutdown(&self) -> Result<(), OutletError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for InboxNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), OutletError> {
        self.storage.record_notification(notification).await
    }
}

#[cfg(test)]
mod tests {
    use outlet_config::model::StorageConfig;
    use outlet_core::types::{Requester, Role, SessionKind, StaffRole, Visibility};
    use outlet_storage::SqliteStorage;

    use super::*;

    fn session() -> OutletSession {
        let owner = Requester::new("u-1", "org-1", Role::Employee);
        OutletSession::new(&owner, None, Visibility::Private, SessionKind::Outlet)
    }

    #[test]
    fn auto_flag_notice_is_critical_broadcast() {
        let s = session();
        let n = escalation_notice(&s, &OutletEscalation::auto_flag(s.id.clone()));
        assert_eq!(n.severity, Severity::Critical);
        assert_eq!(n.kind, NotificationKind::OutletEscalation);
        assert_eq!(n.user_id, None);
        assert_eq!(n.org_id, "org-1");
        assert!(n.body.contains("auto-flag"));
    }

    #[test]
    fn assigned_escalation_targets_assignee() {
        let s = session();
        let entry = OutletEscalation::new(
            s.id.clone(),
            StaffRole::Admin,
            Some("adm-1".into()),
            None,
            Some("u-1".into()),
        );
        let n = escalation_notice(&s, &entry);
        assert_eq!(n.severity, Severity::Warning);
        assert_eq!(n.user_id.as_deref(), Some("adm-1"));
    }

    #[test]
    fn resolution_notice_goes_to_owner() {
        let n = resolution_notice(&session());
        assert_eq!(n.kind, NotificationKind::OutletResolved);
        assert_eq!(n.severity, Severity::Info);
        assert_eq!(n.user_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn inbox_notifier_persists() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("inbox.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let sink = from_config(NotifySink::Inbox, Arc::clone(&storage));
        assert_eq!(sink.name(), "inbox");
        sink.notify(&resolution_notice(&session())).await.unwrap();
        let stored = storage.list_notifications("org-1", Some("u-1")).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, NotificationKind::OutletResolved);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn log_notifier_emits_without_content() {
        let s = session();
        LogNotifier
            .notify(&escalation_notice(&s, &OutletEscalation::auto_flag(s.id.clone())))
            .await
            .unwrap();
        assert!(logs_contain("notification"));
        assert!(logs_contain(&s.id));
    }
}
