// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row decoding for the storage entities.
//!
//! The canonical types live in `outlet_core::types`. Enums are stored as
//! their lowercase names and parsed back with strum; a value the enum does
//! not know surfaces as a conversion error rather than a silent default.

use std::str::FromStr;

use rusqlite::Row;
use rusqlite::types::Type;

pub use outlet_core::types::{Notification, OutletEscalation, OutletMessage, OutletSession};

pub(crate) const SESSION_COLUMNS: &str = "id, org_id, user_id, kind, category, visibility, status, \
     risk_level, last_message_at, last_sender, message_count, resolution_note, \
     resolved_by_user_id, resolved_at, created_at, updated_at";

pub(crate) const MESSAGE_COLUMNS: &str =
    "id, session_id, seq, sender, author_id, content, client_message_id, created_at";

pub(crate) const ESCALATION_COLUMNS: &str = "id, session_id, escalated_to_role, \
     assigned_to_user_id, reason, requested_by_user_id, created_at";

pub(crate) const NOTIFICATION_COLUMNS: &str =
    "id, org_id, user_id, kind, title, body, severity, session_id, created_at";

fn parse_text<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_optional_text<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|value| {
        value
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

pub(crate) fn session_from_row(row: &Row<'_>) -> rusqlite::Result<OutletSession> {
    Ok(OutletSession {
        id: row.get(0)?,
        org_id: row.get(1)?,
        user_id: row.get(2)?,
        kind: parse_text(row, 3)?,
        category: row.get(4)?,
        visibility: parse_text(row, 5)?,
        status: parse_text(row, 6)?,
        risk_level: row.get(7)?,
        last_message_at: row.get(8)?,
        last_sender: parse_optional_text(row, 9)?,
        message_count: row.get(10)?,
        resolution_note: row.get(11)?,
        resolved_by_user_id: row.get(12)?,
        resolved_at: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

pub(crate) fn message_from_row(row: &Row<'_>) -> rusqlite::Result<OutletMessage> {
    Ok(OutletMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        seq: row.get(2)?,
        sender: parse_text(row, 3)?,
        author_id: row.get(4)?,
        content: row.get(5)?,
        client_message_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub(crate) fn escalation_from_row(row: &Row<'_>) -> rusqlite::Result<OutletEscalation> {
    Ok(OutletEscalation {
        id: row.get(0)?,
        session_id: row.get(1)?,
        escalated_to_role: parse_text(row, 2)?,
        assigned_to_user_id: row.get(3)?,
        reason: row.get(4)?,
        requested_by_user_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub(crate) fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        org_id: row.get(1)?,
        user_id: row.get(2)?,
        kind: parse_text(row, 3)?,
        title: row.get(4)?,
        body: row.get(5)?,
        severity: parse_text(row, 6)?,
        session_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}
