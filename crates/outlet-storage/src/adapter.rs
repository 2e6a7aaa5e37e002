// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use outlet_config::model::StorageConfig;
use outlet_core::lifecycle::Transition;
use outlet_core::types::{
    ExchangeOutcome, NewExchange, NewMessage, Notification, OutletEscalation, OutletMessage,
    OutletSession, SessionStatus, StaffRole, StaffScope, TransitionOutcome,
};
use outlet_core::{AdapterType, HealthStatus, OutletError, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened by [`StorageAdapter::initialize`]; every other
/// call before that fails with a storage error.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, OutletError> {
        self.db.get().ok_or_else(|| OutletError::Storage {
            source: "storage not initialized, call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, OutletError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        match db
            .connection()
            .call(|conn| conn.execute_batch("SELECT 1;"))
            .await
            .map_err(crate::database::map_tr_err)
        {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), OutletError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), OutletError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| OutletError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), OutletError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Sessions ---

    async fn create_session(&self, session: &OutletSession) -> Result<(), OutletError> {
        queries::sessions::create_session(self.db()?, session).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<OutletSession>, OutletError> {
        queries::sessions::get_session(self.db()?, id).await
    }

    async fn list_owned_sessions(
        &self,
        user_id: &str,
        status: Option<SessionStatus>,
    ) -> Result<Vec<OutletSession>, OutletError> {
        queries::sessions::list_owned_sessions(self.db()?, user_id, status).await
    }

    async fn list_staff_sessions(
        &self,
        scope: &StaffScope,
        status: Option<SessionStatus>,
    ) -> Result<Vec<OutletSession>, OutletError> {
        queries::sessions::list_staff_sessions(self.db()?, scope, status).await
    }

    async fn apply_transition(
        &self,
        session_id: &str,
        transition: Transition,
    ) -> Result<TransitionOutcome, OutletError> {
        queries::sessions::apply_transition(self.db()?, session_id, transition).await
    }

    // --- Message thread ---

    async fn get_messages(&self, session_id: &str) -> Result<Vec<OutletMessage>, OutletError> {
        queries::messages::get_messages(self.db()?, session_id).await
    }

    async fn find_exchange(
        &self,
        session_id: &str,
        client_message_id: &str,
    ) -> Result<Option<(OutletMessage, OutletMessage)>, OutletError> {
        queries::messages::find_exchange(self.db()?, session_id, client_message_id).await
    }

    async fn append_exchange(&self, exchange: NewExchange) -> Result<ExchangeOutcome, OutletError> {
        queries::messages::append_exchange(self.db()?, exchange).await
    }

    async fn append_staff_reply(
        &self,
        session_id: &str,
        message: NewMessage,
    ) -> Result<(OutletSession, OutletMessage), OutletError> {
        queries::messages::append_staff_reply(self.db()?, session_id, message).await
    }

    // --- Escalation ledger ---

    async fn list_escalations(
        &self,
        session_id: &str,
    ) -> Result<Vec<OutletEscalation>, OutletError> {
        queries::escalations::list_escalations(self.db()?, session_id).await
    }

    async fn has_active_grant(
        &self,
        session_id: &str,
        role: StaffRole,
        user_id: &str,
    ) -> Result<bool, OutletError> {
        queries::escalations::has_active_grant(self.db()?, session_id, role, user_id).await
    }

    // --- Inbox ---

    async fn record_notification(&self, notification: &Notification) -> Result<(), OutletError> {
        queries::notifications::record_notification(self.db()?, notification).await
    }

    async fn list_notifications(
        &self,
        org_id: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<Notification>, OutletError> {
        queries::notifications::list_notifications(self.db()?, org_id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use outlet_core::types::{Requester, Role, SessionKind, Visibility};
    use tempfile::tempdir;

    use super::*;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn identifies_as_storage_adapter() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(dir.path().join("t.db").to_str().unwrap()));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn calls_before_initialize_fail() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(dir.path().join("t.db").to_str().unwrap()));
        assert!(storage.get_session("x").await.is_err());
        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn double_initialize_is_rejected() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(dir.path().join("t.db").to_str().unwrap()));
        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("persist.db");
        let path = path.to_str().unwrap();
        let owner = Requester::new("u-1", "org-1", Role::Employee);
        let session = OutletSession::new(&owner, None, Visibility::Manager, SessionKind::Outlet);

        {
            let storage = SqliteStorage::new(make_config(path));
            storage.initialize().await.unwrap();
            storage.create_session(&session).await.unwrap();
            storage.close().await.unwrap();
        }

        let storage = SqliteStorage::new(make_config(path));
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        let loaded = storage.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded, session);
        storage.shutdown().await.unwrap();
    }
}
