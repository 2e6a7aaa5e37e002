// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access for single sessions.
//!
//! Owner and visibility checks are pure (`outlet_core::access`). The
//! escalation path asks storage whether a matching ledger entry exists, the
//! same predicate the staff listing query evaluates in SQL. Callers that
//! already hold the ledger resolve against it directly.

use std::sync::Arc;

use outlet_core::access::{self, AccessPath};
use outlet_core::types::{OutletEscalation, OutletSession, Requester};
use outlet_core::{OutletError, StorageAdapter};

#[derive(Clone)]
pub struct VisibilityResolver {
    storage: Arc<dyn StorageAdapter>,
}

impl VisibilityResolver {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// The first path that grants `requester` read access, if any.
    pub async fn resolve(
        &self,
        session: &OutletSession,
        requester: &Requester,
    ) -> Result<Option<AccessPath>, OutletError> {
        if session.is_owned_by(requester) {
            return Ok(Some(AccessPath::Owner));
        }
        if access::visibility_grants(session, requester) {
            return Ok(Some(AccessPath::Visibility));
        }
        let Some(role) = access::staff_role_for(session, requester) else {
            return Ok(None);
        };
        let granted = self
            .storage
            .has_active_grant(&session.id, role, &requester.user_id)
            .await?;
        Ok(granted.then_some(AccessPath::Escalation))
    }

    /// Like [`resolve`](Self::resolve) but denial is a `Forbidden` error.
    pub async fn authorize(
        &self,
        session: &OutletSession,
        requester: &Requester,
    ) -> Result<AccessPath, OutletError> {
        self.resolve(session, requester)
            .await?
            .ok_or_else(|| denied(session, requester))
    }

    /// [`authorize`](Self::authorize) against an already loaded ledger.
    pub fn authorize_with_ledger(
        &self,
        session: &OutletSession,
        requester: &Requester,
        ledger: &[OutletEscalation],
    ) -> Result<AccessPath, OutletError> {
        access::resolve(session, requester, ledger).ok_or_else(|| denied(session, requester))
    }
}

fn denied(session: &OutletSession, requester: &Requester) -> OutletError {
    OutletError::Forbidden(format!(
        "{} {} cannot read session {}",
        requester.role, requester.user_id, session.id
    ))
}

#[cfg(test)]
mod tests {
    use outlet_config::model::StorageConfig;
    use outlet_core::lifecycle::Transition;
    use outlet_core::types::{Role, SessionKind, StaffRole, Visibility};
    use outlet_storage::SqliteStorage;

    use super::*;

    async fn storage(dir: &std::path::Path) -> Arc<dyn StorageAdapter> {
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.join("resolver.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        Arc::new(storage)
    }

    #[tokio::test]
    async fn escalation_path_matches_pure_resolver() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let resolver = VisibilityResolver::new(Arc::clone(&storage));

        let owner = Requester::new("u-1", "org-1", Role::Employee);
        let session = OutletSession::new(&owner, None, Visibility::Private, SessionKind::Outlet);
        storage.create_session(&session).await.unwrap();
        let entry = OutletEscalation::new(
            session.id.clone(),
            StaffRole::Manager,
            Some("mgr-1".into()),
            None,
            Some("u-1".into()),
        );
        storage
            .apply_transition(&session.id, Transition::Escalate(entry))
            .await
            .unwrap();
        let session = storage.get_session(&session.id).await.unwrap().unwrap();
        let ledger = storage.list_escalations(&session.id).await.unwrap();

        let requesters = [
            owner.clone(),
            Requester::new("mgr-1", "org-1", Role::Manager),
            Requester::new("mgr-2", "org-1", Role::Manager),
            Requester::new("adm-1", "org-1", Role::Admin),
            Requester::new("mgr-1", "org-2", Role::Manager),
            Requester::new("peer", "org-1", Role::Employee),
        ];
        for requester in &requesters {
            let stored = resolver.resolve(&session, requester).await.unwrap();
            let pure = access::resolve(&session, requester, &ledger);
            assert_eq!(stored, pure, "disagreement for {requester:?}");
        }
        assert_eq!(
            resolver
                .resolve(&session, &requesters[1])
                .await
                .unwrap(),
            Some(AccessPath::Escalation)
        );
        // A manager-level entry reaches admins whoever it is assigned to.
        assert_eq!(
            resolver.authorize(&session, &requesters[3]).await.unwrap(),
            AccessPath::Escalation
        );
        assert!(matches!(
            resolver.authorize(&session, &requesters[2]).await,
            Err(OutletError::Forbidden(_))
        ));
        assert!(matches!(
            resolver.authorize_with_ledger(&session, &requesters[2], &ledger),
            Err(OutletError::Forbidden(_))
        ));
    }
}
