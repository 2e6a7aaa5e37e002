// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Session Orchestrator.
//!
//! Every operation takes the authenticated [`Requester`] first, loads the
//! session, decides who may act, and only then touches storage. Errors keep
//! the two kinds apart: `Forbidden` when the requester may never do this,
//! `InvalidOperation` when the session's kind or state refuses it.

use std::sync::Arc;

use outlet_config::model::LimitsConfig;
use outlet_core::access::AccessPath;
use outlet_core::lifecycle::{Resolution, Transition};
use outlet_core::types::{
    NewExchange, NewMessage, Notification, OutletEscalation, OutletMessage, OutletSession,
    ReplyRequest, Requester, RiskLevel, Sender, SessionKind, SessionStatus, StaffRole, StaffScope,
    Visibility, now_timestamp,
};
use outlet_core::{NotificationSink, OutletError, ReplyProvider, StorageAdapter, lifecycle};
use outlet_risk::{NO_RISK, RiskClassifier};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::locks::SessionLocks;
use crate::notify::{escalation_notice, resolution_notice};
use crate::resolver::VisibilityResolver;

const MAX_CLIENT_MESSAGE_ID_CHARS: usize = 128;
const MAX_USER_ID_CHARS: usize = 128;

/// Input size limits, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_message_chars: usize,
    pub max_category_chars: usize,
    pub max_reason_chars: usize,
    pub max_note_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&LimitsConfig::default())
    }
}

impl From<&LimitsConfig> for Limits {
    fn from(config: &LimitsConfig) -> Self {
        Self {
            max_message_chars: config.max_message_chars,
            max_category_chars: config.max_category_chars,
            max_reason_chars: config.max_reason_chars,
            max_note_chars: config.max_note_chars,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionRequest {
    pub category: Option<String>,
    pub visibility: Visibility,
    pub kind: SessionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalateRequest {
    pub to_role: StaffRole,
    pub assigned_to: Option<String>,
    pub reason: Option<String>,
}

/// Which listing to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListScope {
    /// Sessions the requester owns.
    #[default]
    Mine,
    /// Sessions reachable through a staff path.
    Staff,
}

/// Result of a successful post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedExchange {
    pub user_message: OutletMessage,
    pub ai_message: OutletMessage,
    /// Session risk after the exchange.
    pub risk_level: RiskLevel,
    pub status: SessionStatus,
    /// True when this call appended an auto-flag entry. A replay never
    /// escalates, even if the original commit did; `status` shows the result.
    pub escalated: bool,
    /// True when an earlier commit with the same client message id was returned.
    pub replayed: bool,
}

/// A session with its ordered thread and the path that granted access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub session: OutletSession,
    pub messages: Vec<OutletMessage>,
    pub access: AccessPath,
}

pub struct SessionOrchestrator {
    storage: Arc<dyn StorageAdapter>,
    replies: Arc<dyn ReplyProvider>,
    notifier: Arc<dyn NotificationSink>,
    resolver: VisibilityResolver,
    classifier: RiskClassifier,
    locks: SessionLocks,
    limits: Limits,
}

impl SessionOrchestrator {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        replies: Arc<dyn ReplyProvider>,
        notifier: Arc<dyn NotificationSink>,
        limits: Limits,
    ) -> Self {
        Self {
            resolver: VisibilityResolver::new(Arc::clone(&storage)),
            storage,
            replies,
            notifier,
            classifier: RiskClassifier::new(),
            locks: SessionLocks::new(),
            limits,
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    pub fn resolver(&self) -> &VisibilityResolver {
        &self.resolver
    }

    // --- Writes ---

    /// Open a new session owned by the requester.
    pub async fn create_session(
        &self,
        requester: &Requester,
        request: NewSessionRequest,
    ) -> Result<OutletSession, OutletError> {
        let category = optional_text(request.category, "category", self.limits.max_category_chars)?;
        let session = OutletSession::new(requester, category, request.visibility, request.kind);
        self.storage.create_session(&session).await?;
        info!(
            session_id = %session.id,
            org_id = %session.org_id,
            kind = %session.kind,
            visibility = %session.visibility,
            "session created"
        );
        Ok(session)
    }

    /// Append an owner message and its generated reply as one unit.
    ///
    /// The reply is generated before anything is written; a collaborator
    /// failure leaves the session untouched. A retry carrying the same
    /// `client_message_id` returns the committed exchange.
    pub async fn post_message(
        &self,
        requester: &Requester,
        session_id: &str,
        content: &str,
        client_message_id: Option<String>,
    ) -> Result<PostedExchange, OutletError> {
        let content = required_text(content, "content", self.limits.max_message_chars)?;
        let client_message_id =
            optional_text(client_message_id, "clientMessageId", MAX_CLIENT_MESSAGE_ID_CHARS)?;

        let session = self.load(session_id).await?;
        if !session.is_owned_by(requester) {
            return Err(OutletError::Forbidden(
                "only the session owner can post messages".into(),
            ));
        }

        let _guard = self.locks.acquire(&session.id).await;

        if let Some(key) = client_message_id.as_deref()
            && let Some((user_message, ai_message)) =
                self.storage.find_exchange(&session.id, key).await?
        {
            let current = self.load(&session.id).await?;
            debug!(session_id = %session.id, "replaying committed exchange");
            return Ok(PostedExchange {
                user_message,
                ai_message,
                risk_level: current.risk_level,
                status: current.status,
                escalated: false,
                replayed: true,
            });
        }

        // Re-read under the lock: an earlier post may have changed the row.
        let session = self.load(&session.id).await?;
        lifecycle::ensure_accepts_messages(&session)?;

        let user_message = NewMessage::new(Sender::User, Some(requester.user_id.clone()), &content)
            .with_client_message_id(client_message_id);
        let score = self.classifier.score(&content);
        let generated = self
            .replies
            .generate(ReplyRequest {
                text: content,
                category: session.category.clone(),
                visibility: session.visibility,
            })
            .await
            .inspect_err(|e| {
                warn!(session_id = %session.id, error = %e, "reply generation failed, nothing written");
            })?;

        let provider_score = generated.risk_level.map_or(NO_RISK, outlet_risk::discretize);
        let risk_level = score.max(provider_score);
        let auto_escalation = (outlet_risk::should_escalate(risk_level)
            && session.kind.admits_staff())
        .then(|| OutletEscalation::auto_flag(session.id.clone()));

        let outcome = self
            .storage
            .append_exchange(NewExchange {
                session_id: session.id.clone(),
                owner_id: requester.user_id.clone(),
                user_message,
                reply_message: NewMessage::new(Sender::Ai, None, generated.reply),
                risk_level,
                auto_escalation,
            })
            .await?;

        if let Some(entry) = &outcome.escalation {
            warn!(
                session_id = %outcome.session.id,
                org_id = %outcome.session.org_id,
                risk_level = outcome.session.risk_level,
                to_role = %entry.escalated_to_role,
                "session auto-escalated"
            );
            self.emit(escalation_notice(&outcome.session, entry)).await;
        } else {
            debug!(
                session_id = %outcome.session.id,
                risk_level = outcome.session.risk_level,
                message_count = outcome.session.message_count,
                "exchange committed"
            );
        }

        Ok(PostedExchange {
            risk_level: outcome.session.risk_level,
            status: outcome.session.status,
            escalated: outcome.escalation.is_some(),
            replayed: outcome.replayed,
            user_message: outcome.user_message,
            ai_message: outcome.reply_message,
        })
    }

    /// Append a staff-authored message to a session the staff member can read.
    pub async fn staff_reply(
        &self,
        requester: &Requester,
        session_id: &str,
        content: &str,
    ) -> Result<OutletMessage, OutletError> {
        let content = required_text(content, "content", self.limits.max_message_chars)?;
        let session = self.load(session_id).await?;
        if !requester.role.is_staff() {
            return Err(OutletError::Forbidden("only staff can reply as staff".into()));
        }
        ensure_admits_staff(&session, "answered by staff")?;
        self.resolver.authorize(&session, requester).await?;

        let (session, message) = self
            .storage
            .append_staff_reply(
                &session.id,
                NewMessage::new(Sender::Staff, Some(requester.user_id.clone()), content),
            )
            .await?;
        info!(
            session_id = %session.id,
            staff_id = %requester.user_id,
            seq = message.seq,
            "staff reply appended"
        );
        Ok(message)
    }

    /// Append a ledger entry and move the session to `Escalated`.
    pub async fn escalate(
        &self,
        requester: &Requester,
        session_id: &str,
        request: EscalateRequest,
    ) -> Result<OutletSession, OutletError> {
        let reason = optional_text(request.reason, "reason", self.limits.max_reason_chars)?;
        let assigned_to = optional_text(request.assigned_to, "assignedTo", MAX_USER_ID_CHARS)?;

        let session = self.load(session_id).await?;
        ensure_admits_staff(&session, "escalated")?;
        ensure_owner_or_org_staff(&session, requester, "escalate")?;
        // Staff escalate only sessions they can already read.
        if !session.is_owned_by(requester) {
            self.resolver.authorize(&session, requester).await?;
        }

        let entry = OutletEscalation::new(
            session.id.clone(),
            request.to_role,
            assigned_to,
            reason,
            Some(requester.user_id.clone()),
        );
        let outcome = self
            .storage
            .apply_transition(&session.id, Transition::Escalate(entry))
            .await?;

        if let Some(entry) = &outcome.escalation {
            info!(
                session_id = %outcome.session.id,
                org_id = %outcome.session.org_id,
                to_role = %entry.escalated_to_role,
                assigned = entry.assigned_to_user_id.is_some(),
                status_changed = outcome.status_changed,
                "session escalated"
            );
            self.emit(escalation_notice(&outcome.session, entry)).await;
        }
        Ok(outcome.session)
    }

    /// Close a session. Closing a closed session succeeds without change.
    pub async fn close(
        &self,
        requester: &Requester,
        session_id: &str,
    ) -> Result<OutletSession, OutletError> {
        let session = self.load(session_id).await?;
        if !session.is_owned_by(requester) && !session.kind.admits_staff() {
            return Err(OutletError::Forbidden(
                "only the owner can close a confessional session".into(),
            ));
        }
        ensure_owner_or_org_staff(&session, requester, "close")?;
        if !session.is_owned_by(requester) {
            self.resolver.authorize(&session, requester).await?;
        }

        let outcome = self
            .storage
            .apply_transition(&session.id, Transition::Close)
            .await?;
        if outcome.status_changed {
            info!(session_id = %outcome.session.id, "session closed");
        }
        Ok(outcome.session)
    }

    /// Staff resolution with an optional note.
    pub async fn resolve(
        &self,
        requester: &Requester,
        session_id: &str,
        note: Option<String>,
    ) -> Result<OutletSession, OutletError> {
        let note = optional_text(note, "resolutionNote", self.limits.max_note_chars)?;

        let session = self.load(session_id).await?;
        ensure_admits_staff(&session, "resolved")?;
        if !requester.role.is_staff() {
            return Err(OutletError::InvalidOperation(
                "sessions can only be resolved by staff".into(),
            ));
        }
        self.resolver.authorize(&session, requester).await?;

        let outcome = self
            .storage
            .apply_transition(
                &session.id,
                Transition::Resolve(Resolution {
                    note,
                    resolved_by_user_id: requester.user_id.clone(),
                    resolved_at: now_timestamp(),
                }),
            )
            .await?;
        info!(
            session_id = %outcome.session.id,
            org_id = %outcome.session.org_id,
            resolved_by = %requester.user_id,
            "session resolved"
        );
        self.emit(resolution_notice(&outcome.session)).await;
        Ok(outcome.session)
    }

    // --- Reads ---

    /// A session and its thread, if the requester can read it.
    pub async fn get_session(
        &self,
        requester: &Requester,
        session_id: &str,
    ) -> Result<SessionDetail, OutletError> {
        let session = self.load(session_id).await?;
        let access = self.resolver.authorize(&session, requester).await?;
        let messages = self.storage.get_messages(&session.id).await?;
        Ok(SessionDetail {
            session,
            messages,
            access,
        })
    }

    pub async fn list_sessions(
        &self,
        requester: &Requester,
        scope: ListScope,
        status: Option<SessionStatus>,
    ) -> Result<Vec<OutletSession>, OutletError> {
        match scope {
            ListScope::Mine => {
                self.storage
                    .list_owned_sessions(&requester.user_id, status)
                    .await
            }
            ListScope::Staff => {
                let scope = StaffScope::of(requester).ok_or_else(|| {
                    OutletError::Forbidden("the staff listing is for managers and admins".into())
                })?;
                self.storage.list_staff_sessions(&scope, status).await
            }
        }
    }

    /// The escalation ledger of a session the requester can read.
    pub async fn list_escalations(
        &self,
        requester: &Requester,
        session_id: &str,
    ) -> Result<Vec<OutletEscalation>, OutletError> {
        let session = self.load(session_id).await?;
        let ledger = self.storage.list_escalations(&session.id).await?;
        self.resolver.authorize_with_ledger(&session, requester, &ledger)?;
        Ok(ledger)
    }

    /// Inbox entries addressed to the requester, newest first.
    pub async fn list_notifications(
        &self,
        requester: &Requester,
    ) -> Result<Vec<Notification>, OutletError> {
        self.storage
            .list_notifications(&requester.org_id, Some(&requester.user_id))
            .await
    }

    async fn load(&self, session_id: &str) -> Result<OutletSession, OutletError> {
        self.storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| OutletError::session_not_found(session_id))
    }

    async fn emit(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(&notification).await {
            warn!(
                session_id = %notification.session_id,
                kind = %notification.kind,
                sink = self.notifier.name(),
                error = %e,
                "notification delivery failed"
            );
        }
    }
}

fn ensure_admits_staff(session: &OutletSession, verb: &str) -> Result<(), OutletError> {
    if session.kind.admits_staff() {
        Ok(())
    } else {
        Err(OutletError::InvalidOperation(format!(
            "{} sessions cannot be {verb}",
            session.kind
        )))
    }
}

fn ensure_owner_or_org_staff(
    session: &OutletSession,
    requester: &Requester,
    action: &str,
) -> Result<(), OutletError> {
    let org_staff = requester.role.is_staff() && requester.org_id == session.org_id;
    if session.is_owned_by(requester) || org_staff {
        Ok(())
    } else {
        Err(OutletError::Forbidden(format!(
            "only the owner or staff of the session's organization can {action} it"
        )))
    }
}

fn required_text(value: &str, field: &str, max_chars: usize) -> Result<String, OutletError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OutletError::Validation(format!("{field} must not be empty")));
    }
    check_length(trimmed, field, max_chars)?;
    Ok(trimmed.to_string())
}

/// Blank optional text becomes `None`.
fn optional_text(
    value: Option<String>,
    field: &str,
    max_chars: usize,
) -> Result<Option<String>, OutletError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_length(trimmed, field, max_chars)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn check_length(value: &str, field: &str, max_chars: usize) -> Result<(), OutletError> {
    let count = value.chars().count();
    if count > max_chars {
        Err(OutletError::Validation(format!(
            "{field} is {count} characters, the limit is {max_chars}"
        )))
    } else {
        Ok(())
    }
}
