// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for orchestrator and gateway tests.
//!
//! `TestHarness` wires a [`SessionOrchestrator`] to a temp SQLite database,
//! a [`MockReplyProvider`] and a [`RecordingNotifier`], and offers helpers
//! for the common identities.

use std::sync::Arc;

use outlet_config::model::{LimitsConfig, StorageConfig};
use outlet_core::types::{OutletSession, Requester, Role, SessionKind, Visibility};
use outlet_core::{OutletError, StorageAdapter};
use outlet_session::{Limits, NewSessionRequest, SessionOrchestrator};
use outlet_storage::SqliteStorage;

use crate::mock_notifier::RecordingNotifier;
use crate::mock_reply::MockReplyProvider;

/// Org every helper identity belongs to.
pub const TEST_ORG: &str = "org-test";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<String>,
    limits: LimitsConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            limits: LimitsConfig::default(),
        }
    }

    /// Set queued mock replies.
    pub fn with_replies(mut self, replies: Vec<String>) -> Self {
        self.replies = replies;
        self
    }

    /// Override the input size limits.
    pub fn with_limits(mut self, limits: LimitsConfig) -> Self {
        self.limits = limits;
        self
    }

    /// Build the harness, creating and migrating a temp database.
    pub async fn build(self) -> Result<TestHarness, OutletError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| OutletError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("outlet-test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let replies = Arc::new(MockReplyProvider::with_replies(self.replies));
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = Arc::new(SessionOrchestrator::new(
            Arc::clone(&storage),
            replies.clone(),
            notifier.clone(),
            Limits::from(&self.limits),
        ));

        Ok(TestHarness {
            orchestrator,
            storage,
            replies,
            notifier,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete orchestrator over temp storage and mock collaborators.
pub struct TestHarness {
    pub orchestrator: Arc<SessionOrchestrator>,
    /// SQLite storage (temp DB, removed on drop).
    pub storage: Arc<dyn StorageAdapter>,
    pub replies: Arc<MockReplyProvider>,
    pub notifier: Arc<RecordingNotifier>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// An employee of the test org.
    pub fn employee(user_id: &str) -> Requester {
        Requester::new(user_id, TEST_ORG, Role::Employee)
    }

    pub fn manager(user_id: &str) -> Requester {
        Requester::new(user_id, TEST_ORG, Role::Manager)
    }

    pub fn admin(user_id: &str) -> Requester {
        Requester::new(user_id, TEST_ORG, Role::Admin)
    }

    /// Create a session for `owner` with no category.
    pub async fn open_session(
        &self,
        owner: &Requester,
        visibility: Visibility,
        kind: SessionKind,
    ) -> Result<OutletSession, OutletError> {
        self.orchestrator
            .create_session(
                owner,
                NewSessionRequest {
                    category: None,
                    visibility,
                    kind,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_and_posts() {
        let harness = TestHarness::builder()
            .with_replies(vec!["I'm listening.".into()])
            .build()
            .await
            .unwrap();
        let owner = TestHarness::employee("u-1");
        let session = harness
            .open_session(&owner, Visibility::Private, SessionKind::Outlet)
            .await
            .unwrap();
        let posted = harness
            .orchestrator
            .post_message(&owner, &session.id, "rough week", None)
            .await
            .unwrap();
        assert_eq!(posted.ai_message.content, "I'm listening.");
        assert_eq!(harness.replies.call_count(), 1);
        assert!(harness.notifier.notifications().await.is_empty());
    }
}
