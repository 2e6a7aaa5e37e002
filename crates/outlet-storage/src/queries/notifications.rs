// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbox rows written by the storage-backed notification sink.

use outlet_core::OutletError;
use outlet_core::types::Notification;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{NOTIFICATION_COLUMNS, notification_from_row};

pub async fn record_notification(
    db: &Database,
    notification: &Notification,
) -> Result<(), OutletError> {
    let n = notification.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO outlet_notifications (id, org_id, user_id, kind, title, body,
                     severity, session_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    n.id,
                    n.org_id,
                    n.user_id,
                    n.kind.to_string(),
                    n.title,
                    n.body,
                    n.severity.to_string(),
                    n.session_id,
                    n.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Newest first. With `user_id`, only entries addressed to that user.
pub async fn list_notifications(
    db: &Database,
    org_id: &str,
    user_id: Option<&str>,
) -> Result<Vec<Notification>, OutletError> {
    let org_id = org_id.to_string();
    let user_id = user_id.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM outlet_notifications
                 WHERE org_id = ?1 AND (?2 IS NULL OR user_id = ?2)
                 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![org_id, user_id], notification_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
