// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::OutletError;
use crate::lifecycle::Transition;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ExchangeOutcome, NewExchange, NewMessage, Notification, OutletEscalation, OutletMessage,
    OutletSession, SessionStatus, StaffRole, StaffScope, TransitionOutcome,
};

/// Adapter for storage and persistence backends.
///
/// The backend is the single writer of session status, risk level and summary
/// fields, and the only writer of the escalation ledger. Every mutating method
/// is atomic: it loads the current row, applies the rules in
/// [`crate::lifecycle`], and commits all resulting writes together or none.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), OutletError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), OutletError>;

    // --- Sessions ---

    async fn create_session(&self, session: &OutletSession) -> Result<(), OutletError>;

    async fn get_session(&self, id: &str) -> Result<Option<OutletSession>, OutletError>;

    /// Sessions owned by `user_id`, newest first.
    async fn list_owned_sessions(
        &self,
        user_id: &str,
        status: Option<SessionStatus>,
    ) -> Result<Vec<OutletSession>, OutletError>;

    /// Sessions readable by a staff member through either the visibility or
    /// the escalation path, evaluated in a single query, newest activity first.
    /// Never includes confessional sessions.
    async fn list_staff_sessions(
        &self,
        scope: &StaffScope,
        status: Option<SessionStatus>,
    ) -> Result<Vec<OutletSession>, OutletError>;

    /// Apply an escalate, close or resolve transition.
    async fn apply_transition(
        &self,
        session_id: &str,
        transition: Transition,
    ) -> Result<TransitionOutcome, OutletError>;

    // --- Message thread ---

    /// Messages of a session ordered by `seq` ascending.
    async fn get_messages(&self, session_id: &str) -> Result<Vec<OutletMessage>, OutletError>;

    /// Look up a previously committed exchange by its owner-supplied idempotency key.
    async fn find_exchange(
        &self,
        session_id: &str,
        client_message_id: &str,
    ) -> Result<Option<(OutletMessage, OutletMessage)>, OutletError>;

    /// Commit an owner message, its reply, the risk bump and any auto-escalation.
    async fn append_exchange(&self, exchange: NewExchange) -> Result<ExchangeOutcome, OutletError>;

    /// Append a staff-authored message.
    async fn append_staff_reply(
        &self,
        session_id: &str,
        message: NewMessage,
    ) -> Result<(OutletSession, OutletMessage), OutletError>;

    // --- Escalation ledger ---

    /// Ledger entries of a session, oldest first.
    async fn list_escalations(&self, session_id: &str)
    -> Result<Vec<OutletEscalation>, OutletError>;

    /// Whether any ledger entry on the session names `role` and is unassigned
    /// or assigned to `user_id`.
    async fn has_active_grant(
        &self,
        session_id: &str,
        role: StaffRole,
        user_id: &str,
    ) -> Result<bool, OutletError>;

    // --- Inbox ---

    async fn record_notification(&self, notification: &Notification) -> Result<(), OutletError>;

    /// Inbox entries addressed to an org (and optionally one recipient), newest first.
    async fn list_notifications(
        &self,
        org_id: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<Notification>, OutletError>;
}
