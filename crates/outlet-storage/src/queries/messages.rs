// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message thread: ordered, append-only, one transaction per append.

use outlet_core::OutletError;
use outlet_core::lifecycle::{self, Transition};
use outlet_core::types::{
    ExchangeOutcome, NewExchange, NewMessage, OutletMessage, OutletSession, Sender,
};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::database::{Database, TxError, map_tr_err, map_tx_err};
use crate::models::{MESSAGE_COLUMNS, message_from_row};
use crate::queries::escalations::insert_escalation;
use crate::queries::sessions::{select_session, update_session};

/// All messages of a session, ascending by sequence number.
pub async fn get_messages(db: &Database, session_id: &str) -> Result<Vec<OutletMessage>, OutletError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM outlet_messages
                 WHERE session_id = ?1 ORDER BY seq ASC"
            ))?;
            let rows = stmt.query_map(params![session_id], message_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// The stored (user, reply) pair for an idempotency key, if committed.
pub async fn find_exchange(
    db: &Database,
    session_id: &str,
    client_message_id: &str,
) -> Result<Option<(OutletMessage, OutletMessage)>, OutletError> {
    let session_id = session_id.to_string();
    let client_message_id = client_message_id.to_string();
    db.connection()
        .call(move |conn| select_exchange(conn, &session_id, &client_message_id))
        .await
        .map_err(map_tr_err)
}

/// Commit an owner message and its reply as one unit.
///
/// Inside a single immediate transaction: re-read the session, replay a
/// committed exchange with the same client message id, re-check that the
/// session accepts messages, append both messages with consecutive sequence
/// numbers, update the summary, raise risk and apply any auto-escalation.
pub async fn append_exchange(db: &Database, exchange: NewExchange) -> Result<ExchangeOutcome, OutletError> {
    db.connection()
        .call(move |conn| -> Result<ExchangeOutcome, TxError> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut session = load_for_write(&tx, &exchange.session_id)?;
            if session.user_id != exchange.owner_id {
                return Err(OutletError::Forbidden(
                    "only the session owner can post messages".into(),
                )
                .into());
            }

            if let Some(key) = exchange.user_message.client_message_id.as_deref()
                && let Some((user_message, reply_message)) = select_exchange(&tx, &session.id, key)?
            {
                return Ok(ExchangeOutcome {
                    session,
                    user_message,
                    reply_message,
                    escalation: None,
                    replayed: true,
                });
            }

            lifecycle::ensure_accepts_messages(&session)?;

            let seq = last_seq(&tx, &session.id)?;
            let user_message = exchange.user_message.into_message(&session.id, seq + 1);
            let reply_message = exchange.reply_message.into_message(&session.id, seq + 2);
            insert_message(&tx, &user_message)?;
            lifecycle::record_message(&mut session, Sender::User, &user_message.created_at);
            insert_message(&tx, &reply_message)?;
            lifecycle::record_message(&mut session, reply_message.sender, &reply_message.created_at);
            lifecycle::raise_risk(&mut session, exchange.risk_level);

            let escalation = match exchange.auto_escalation {
                Some(entry) => {
                    let transition = Transition::Escalate(entry.clone());
                    let plan = lifecycle::plan(&session, &transition)?;
                    lifecycle::apply(&mut session, &transition, plan, &reply_message.created_at);
                    insert_escalation(&tx, &entry)?;
                    Some(entry)
                }
                None => None,
            };

            update_session(&tx, &session)?;
            tx.commit()?;

            Ok(ExchangeOutcome {
                session,
                user_message,
                reply_message,
                escalation,
                replayed: false,
            })
        })
        .await
        .map_err(map_tx_err)
}

/// Append a staff-authored message. Risk and status are untouched.
pub async fn append_staff_reply(
    db: &Database,
    session_id: &str,
    message: NewMessage,
) -> Result<(OutletSession, OutletMessage), OutletError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<(OutletSession, OutletMessage), TxError> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut session = load_for_write(&tx, &session_id)?;
            lifecycle::ensure_accepts_staff_reply(&session)?;

            let seq = last_seq(&tx, &session.id)?;
            let message = message.into_message(&session.id, seq + 1);
            insert_message(&tx, &message)?;
            lifecycle::record_message(&mut session, Sender::Staff, &message.created_at);
            update_session(&tx, &session)?;
            tx.commit()?;
            Ok((session, message))
        })
        .await
        .map_err(map_tx_err)
}

fn load_for_write(conn: &Connection, session_id: &str) -> Result<OutletSession, TxError> {
    select_session(conn, session_id)?
        .ok_or_else(|| OutletError::session_not_found(session_id).into())
}

fn last_seq(conn: &Connection, session_id: &str) -> Result<u32, rusqlite::Error> {
    conn.query_row(
        "SELECT COALESCE(MAX(seq), 0) FROM outlet_messages WHERE session_id = ?1",
        params![session_id],
        |row| row.get(0),
    )
}

fn insert_message(conn: &Connection, message: &OutletMessage) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO outlet_messages (id, session_id, seq, sender, author_id, content,
             client_message_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            message.id,
            message.session_id,
            message.seq,
            message.sender.to_string(),
            message.author_id,
            message.content,
            message.client_message_id,
            message.created_at,
        ],
    )?;
    Ok(())
}

fn select_exchange(
    conn: &Connection,
    session_id: &str,
    client_message_id: &str,
) -> Result<Option<(OutletMessage, OutletMessage)>, rusqlite::Error> {
    let user_message = conn
        .query_row(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM outlet_messages
                 WHERE session_id = ?1 AND client_message_id = ?2"
            ),
            params![session_id, client_message_id],
            message_from_row,
        )
        .optional()?;
    let Some(user_message) = user_message else {
        return Ok(None);
    };
    let reply = conn
        .query_row(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM outlet_messages
                 WHERE session_id = ?1 AND seq = ?2"
            ),
            params![session_id, user_message.seq + 1],
            message_from_row,
        )
        .optional()?;
    Ok(reply.map(|reply| (user_message, reply)))
}
