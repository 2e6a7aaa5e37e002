// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation ledger. Rows are inserted inside transition and exchange
//! transactions only; triggers reject every update and delete.

use outlet_core::OutletError;
use outlet_core::types::{OutletEscalation, StaffRole};
use rusqlite::{Connection, params};

use crate::database::{Database, map_tr_err};
use crate::models::{ESCALATION_COLUMNS, escalation_from_row};

pub(crate) fn insert_escalation(
    conn: &Connection,
    entry: &OutletEscalation,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO outlet_escalations (id, session_id, escalated_to_role,
             assigned_to_user_id, reason, requested_by_user_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.id,
            entry.session_id,
            entry.escalated_to_role.to_string(),
            entry.assigned_to_user_id,
            entry.reason,
            entry.requested_by_user_id,
            entry.created_at,
        ],
    )?;
    Ok(())
}

/// Ledger entries for a session in append order.
pub async fn list_escalations(
    db: &Database,
    session_id: &str,
) -> Result<Vec<OutletEscalation>, OutletError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ESCALATION_COLUMNS} FROM outlet_escalations
                 WHERE session_id = ?1 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map(params![session_id], escalation_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Some entry grants `role` and `user_id`, following
/// `OutletEscalation::grants`.
pub async fn has_active_grant(
    db: &Database,
    session_id: &str,
    role: StaffRole,
    user_id: &str,
) -> Result<bool, OutletError> {
    let session_id = session_id.to_string();
    let role = role.to_string();
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT EXISTS (
                     SELECT 1 FROM outlet_escalations
                     WHERE session_id = ?1
                       AND (
                             (escalated_to_role = ?2
                              AND (assigned_to_user_id IS NULL OR assigned_to_user_id = ?3))
                          OR (escalated_to_role = 'manager' AND ?2 = 'admin')
                       )
                 )",
                params![session_id, role, user_id],
                |row| row.get::<_, bool>(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use outlet_core::lifecycle::Transition;
    use outlet_core::types::{OutletSession, Requester, Role, SessionKind, Visibility};

    use super::*;
    use crate::queries::sessions::{apply_transition, create_session};

    #[tokio::test]
    async fn grant_matches_role_and_assignee() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = Requester::new("u-1", "org-1", Role::Employee);
        let s = OutletSession::new(&owner, None, Visibility::Private, SessionKind::Outlet);
        create_session(&db, &s).await.unwrap();

        assert!(!has_active_grant(&db, &s.id, StaffRole::Admin, "adm-1").await.unwrap());

        let entry = OutletEscalation::new(
            s.id.clone(),
            StaffRole::Admin,
            Some("adm-1".into()),
            None,
            Some("u-1".into()),
        );
        apply_transition(&db, &s.id, Transition::Escalate(entry)).await.unwrap();

        assert!(has_active_grant(&db, &s.id, StaffRole::Admin, "adm-1").await.unwrap());
        assert!(!has_active_grant(&db, &s.id, StaffRole::Admin, "adm-2").await.unwrap());
        assert!(!has_active_grant(&db, &s.id, StaffRole::Manager, "adm-1").await.unwrap());
    }

    #[tokio::test]
    async fn manager_grant_also_admits_admins() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = Requester::new("u-1", "org-1", Role::Employee);
        let s = OutletSession::new(&owner, None, Visibility::Private, SessionKind::Outlet);
        create_session(&db, &s).await.unwrap();

        let entry = OutletEscalation::new(
            s.id.clone(),
            StaffRole::Manager,
            Some("mgr-1".into()),
            None,
            Some("u-1".into()),
        );
        apply_transition(&db, &s.id, Transition::Escalate(entry)).await.unwrap();

        assert!(has_active_grant(&db, &s.id, StaffRole::Manager, "mgr-1").await.unwrap());
        assert!(!has_active_grant(&db, &s.id, StaffRole::Manager, "mgr-2").await.unwrap());
        assert!(has_active_grant(&db, &s.id, StaffRole::Admin, "adm-1").await.unwrap());
    }

    #[tokio::test]
    async fn ledger_rejects_mutation() {
        let db = Database::open_in_memory().await.unwrap();
        let owner = Requester::new("u-1", "org-1", Role::Employee);
        let s = OutletSession::new(&owner, None, Visibility::Private, SessionKind::Outlet);
        create_session(&db, &s).await.unwrap();
        apply_transition(
            &db,
            &s.id,
            Transition::Escalate(OutletEscalation::auto_flag(s.id.clone())),
        )
        .await
        .unwrap();

        let update = db
            .connection()
            .call(|conn| conn.execute("UPDATE outlet_escalations SET reason = 'edited'", []))
            .await
            .map_err(map_tr_err);
        assert!(update.is_err());
        let delete = db
            .connection()
            .call(|conn| conn.execute("DELETE FROM outlet_escalations", []))
            .await
            .map_err(map_tr_err);
        assert!(delete.is_err());
        assert_eq!(list_escalations(&db, &s.id).await.unwrap().len(), 1);
    }
}
