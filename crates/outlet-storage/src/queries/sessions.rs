// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session rows, listings and lifecycle transitions.

use outlet_core::lifecycle::{self, Transition};
use outlet_core::types::{
    OutletSession, SessionStatus, StaffScope, TransitionOutcome, now_timestamp,
};
use outlet_core::OutletError;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::database::{Database, TxError, map_tr_err, map_tx_err};
use crate::models::{SESSION_COLUMNS, session_from_row};
use crate::queries::escalations::insert_escalation;

/// Staff reachability in one statement: same org, outlet kind, and either the
/// visibility ceiling admits the role or a ledger entry grants it (the role
/// itself with no assignee or this assignee, or any manager entry for an
/// admin). Mirrors `outlet_core::access::resolve` for non-owners.
const STAFF_SESSIONS_SQL: &str = "
    FROM outlet_sessions s
    WHERE s.org_id = ?1
      AND s.kind = 'outlet'
      AND (
            s.visibility = 'manager'
         OR (s.visibility = 'admin' AND ?2 = 'admin')
         OR EXISTS (
                SELECT 1 FROM outlet_escalations e
                WHERE e.session_id = s.id
                  AND (
                        (e.escalated_to_role = ?2
                         AND (e.assigned_to_user_id IS NULL OR e.assigned_to_user_id = ?3))
                     OR (e.escalated_to_role = 'manager' AND ?2 = 'admin')
                  )
            )
      )
      AND (?4 IS NULL OR s.status = ?4)
    ORDER BY s.updated_at DESC, s.rowid DESC";

pub async fn create_session(db: &Database, session: &OutletSession) -> Result<(), OutletError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO outlet_sessions (id, org_id, user_id, kind, category, visibility,
                     status, risk_level, last_message_at, last_sender, message_count,
                     resolution_note, resolved_by_user_id, resolved_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    session.id,
                    session.org_id,
                    session.user_id,
                    session.kind.to_string(),
                    session.category,
                    session.visibility.to_string(),
                    session.status.to_string(),
                    session.risk_level,
                    session.last_message_at,
                    session.last_sender.map(|s| s.to_string()),
                    session.message_count,
                    session.resolution_note,
                    session.resolved_by_user_id,
                    session.resolved_at,
                    session.created_at,
                    session.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_session(db: &Database, id: &str) -> Result<Option<OutletSession>, OutletError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| select_session(conn, &id))
        .await
        .map_err(map_tr_err)
}

/// Sessions owned by `user_id`, most recently active first.
pub async fn list_owned_sessions(
    db: &Database,
    user_id: &str,
    status: Option<SessionStatus>,
) -> Result<Vec<OutletSession>, OutletError> {
    let user_id = user_id.to_string();
    let status = status.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM outlet_sessions
                 WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
                 ORDER BY updated_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![user_id, status], session_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Sessions a staff member reaches through the visibility or escalation path.
pub async fn list_staff_sessions(
    db: &Database,
    scope: &StaffScope,
    status: Option<SessionStatus>,
) -> Result<Vec<OutletSession>, OutletError> {
    let org_id = scope.org_id.clone();
    let role = scope.role.to_string();
    let user_id = scope.user_id.clone();
    let status = status.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let columns = SESSION_COLUMNS
                .split(", ")
                .map(|c| format!("s.{}", c.trim()))
                .collect::<Vec<_>>()
                .join(", ");
            let mut stmt = conn.prepare(&format!("SELECT {columns} {STAFF_SESSIONS_SQL}"))?;
            let rows = stmt.query_map(params![org_id, role, user_id, status], session_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a lifecycle transition in one immediate transaction.
///
/// The current row is re-read inside the transaction, so the planner always
/// judges the committed state, never a stale copy held by the caller.
pub async fn apply_transition(
    db: &Database,
    session_id: &str,
    transition: Transition,
) -> Result<TransitionOutcome, OutletError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<TransitionOutcome, TxError> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut session = select_session(&tx, &session_id)?
                .ok_or_else(|| OutletError::session_not_found(&session_id))?;

            let plan = lifecycle::plan(&session, &transition)?;
            let status_changed = lifecycle::apply(&mut session, &transition, plan, &now_timestamp());

            let escalation = match transition {
                Transition::Escalate(entry) => {
                    insert_escalation(&tx, &entry)?;
                    Some(entry)
                }
                Transition::Close | Transition::Resolve(_) => None,
            };
            if status_changed || escalation.is_some() {
                update_session(&tx, &session)?;
            }
            tx.commit()?;

            Ok(TransitionOutcome {
                session,
                escalation,
                status_changed,
            })
        })
        .await
        .map_err(map_tx_err)
}

pub(crate) fn select_session(
    conn: &Connection,
    id: &str,
) -> Result<Option<OutletSession>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM outlet_sessions WHERE id = ?1"),
        params![id],
        session_from_row,
    )
    .optional()
}

/// Write back every mutable column of a session row.
pub(crate) fn update_session(conn: &Connection, session: &OutletSession) -> Result<(), rusqlite::Error> {
    conn.execute(
        "UPDATE outlet_sessions
         SET status = ?2, risk_level = ?3, last_message_at = ?4, last_sender = ?5,
             message_count = ?6, resolution_note = ?7, resolved_by_user_id = ?8,
             resolved_at = ?9, updated_at = ?10
         WHERE id = ?1",
        params![
            session.id,
            session.status.to_string(),
            session.risk_level,
            session.last_message_at,
            session.last_sender.map(|s| s.to_string()),
            session.message_count,
            session.resolution_note,
            session.resolved_by_user_id,
            session.resolved_at,
            session.updated_at,
        ],
    )?;
    Ok(())
}
