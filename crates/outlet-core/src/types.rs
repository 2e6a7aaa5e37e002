// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Outlet crates.
//!
//! Every closed set (roles, kinds, visibilities, statuses, senders) is an enum
//! with lowercase wire and storage names, so kind- and role-dependent rules are
//! matched exhaustively instead of compared as strings.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Discrete risk score produced by the classifier. Only ever raised on a session.
pub type RiskLevel = u8;

/// Current UTC time in the millisecond ISO 8601 format used for every stored timestamp.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Generate a fresh entity identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Role of an authenticated requester. Closed three-value set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    /// The staff role, if this role is a staff role.
    pub fn as_staff(self) -> Option<StaffRole> {
        match self {
            Role::Employee => None,
            Role::Manager => Some(StaffRole::Manager),
            Role::Admin => Some(StaffRole::Admin),
        }
    }

    pub fn is_staff(self) -> bool {
        self.as_staff().is_some()
    }
}

/// The staff subset of [`Role`]: the targets an escalation may name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Manager,
    Admin,
}

impl From<StaffRole> for Role {
    fn from(role: StaffRole) -> Self {
        match role {
            StaffRole::Manager => Role::Manager,
            StaffRole::Admin => Role::Admin,
        }
    }
}

/// Structural session variant.
///
/// `Confessional` is a private journal: never visible to staff, never
/// escalated, never resolved, whatever its visibility field says.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Outlet,
    Confessional,
}

impl SessionKind {
    /// Whether staff can ever see, escalate or resolve sessions of this kind.
    pub fn admits_staff(self) -> bool {
        matches!(self, SessionKind::Outlet)
    }
}

/// Owner-chosen ceiling on staff access absent escalation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Manager,
    Admin,
}

impl Visibility {
    /// Whether this ceiling lets the given staff role read the session.
    ///
    /// `Manager` visibility is readable by managers and admins, `Admin` only by
    /// admins, `Private` by no staff role.
    pub fn permits(self, role: StaffRole) -> bool {
        match self {
            Visibility::Private => false,
            Visibility::Manager => true,
            Visibility::Admin => role == StaffRole::Admin,
        }
    }
}

/// Lifecycle state of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Escalated,
    Closed,
    Resolved,
}

impl SessionStatus {
    /// `Closed` and `Resolved` accept no further messages, escalations or resolutions.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Closed | SessionStatus::Resolved)
    }
}

/// Author class of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
    Staff,
}

/// Identity and role of whoever is calling into the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub user_id: String,
    pub org_id: String,
    pub role: Role,
}

impl Requester {
    pub fn new(user_id: impl Into<String>, org_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            org_id: org_id.into(),
            role,
        }
    }

    pub fn staff_role(&self) -> Option<StaffRole> {
        self.role.as_staff()
    }
}

/// One owner-scoped support conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletSession {
    pub id: String,
    pub org_id: String,
    /// Owner. Never changes after creation.
    pub user_id: String,
    pub kind: SessionKind,
    pub category: Option<String>,
    pub visibility: Visibility,
    pub status: SessionStatus,
    pub risk_level: RiskLevel,
    pub last_message_at: Option<String>,
    pub last_sender: Option<Sender>,
    pub message_count: u32,
    pub resolution_note: Option<String>,
    pub resolved_by_user_id: Option<String>,
    pub resolved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl OutletSession {
    /// Open a new session owned by `owner`.
    ///
    /// Confessional sessions are always created `Private`, whatever was requested.
    pub fn new(
        owner: &Requester,
        category: Option<String>,
        visibility: Visibility,
        kind: SessionKind,
    ) -> Self {
        let now = now_timestamp();
        let visibility = match kind {
            SessionKind::Confessional => Visibility::Private,
            SessionKind::Outlet => visibility,
        };
        Self {
            id: new_id(),
            org_id: owner.org_id.clone(),
            user_id: owner.user_id.clone(),
            kind,
            category,
            visibility,
            status: SessionStatus::Open,
            risk_level: 0,
            last_message_at: None,
            last_sender: None,
            message_count: 0,
            resolution_note: None,
            resolved_by_user_id: None,
            resolved_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, requester: &Requester) -> bool {
        self.user_id == requester.user_id
    }
}

/// An immutable message in a session thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletMessage {
    pub id: String,
    pub session_id: String,
    /// Position in the session thread, starting at 1.
    pub seq: u32,
    pub sender: Sender,
    /// User id of the human author. `None` for AI replies.
    pub author_id: Option<String>,
    pub content: String,
    /// Caller-supplied idempotency key on owner messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_message_id: Option<String>,
    pub created_at: String,
}

/// A message not yet written; storage assigns `seq` inside the append transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub id: String,
    pub sender: Sender,
    pub author_id: Option<String>,
    pub content: String,
    pub client_message_id: Option<String>,
    pub created_at: String,
}

impl NewMessage {
    pub fn new(sender: Sender, author_id: Option<String>, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            sender,
            author_id,
            content: content.into(),
            client_message_id: None,
            created_at: now_timestamp(),
        }
    }

    pub fn with_client_message_id(mut self, client_message_id: Option<String>) -> Self {
        self.client_message_id = client_message_id;
        self
    }

    /// Materialize the stored form at the given position.
    pub fn into_message(self, session_id: &str, seq: u32) -> OutletMessage {
        OutletMessage {
            id: self.id,
            session_id: session_id.to_string(),
            seq,
            sender: self.sender,
            author_id: self.author_id,
            content: self.content,
            client_message_id: self.client_message_id,
            created_at: self.created_at,
        }
    }
}

/// Reason recorded on escalations raised by the risk classifier.
pub const AUTO_FLAG_REASON: &str = "auto-flag";

/// Append-only audit record of one escalation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletEscalation {
    pub id: String,
    pub session_id: String,
    pub escalated_to_role: StaffRole,
    /// `None` grants every staff member holding `escalated_to_role`.
    pub assigned_to_user_id: Option<String>,
    pub reason: Option<String>,
    /// Who asked for it. `None` when raised automatically.
    pub requested_by_user_id: Option<String>,
    pub created_at: String,
}

impl OutletEscalation {
    pub fn new(
        session_id: impl Into<String>,
        escalated_to_role: StaffRole,
        assigned_to_user_id: Option<String>,
        reason: Option<String>,
        requested_by_user_id: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            session_id: session_id.into(),
            escalated_to_role,
            assigned_to_user_id,
            reason,
            requested_by_user_id,
            created_at: now_timestamp(),
        }
    }

    /// The classifier-triggered escalation: to any admin, reason `auto-flag`.
    pub fn auto_flag(session_id: impl Into<String>) -> Self {
        Self::new(
            session_id,
            StaffRole::Admin,
            None,
            Some(AUTO_FLAG_REASON.to_string()),
            None,
        )
    }

    pub fn is_auto_flag(&self) -> bool {
        self.requested_by_user_id.is_none() && self.reason.as_deref() == Some(AUTO_FLAG_REASON)
    }

    /// Whether this entry grants read access to a staff member with `role` and `user_id`.
    ///
    /// The named role reads when the entry is unassigned or assigned to them.
    /// Admins also read every manager-level entry, the same ordering
    /// [`Visibility::permits`] uses.
    pub fn grants(&self, role: StaffRole, user_id: &str) -> bool {
        match (self.escalated_to_role, role) {
            (StaffRole::Manager, StaffRole::Admin) => true,
            (target, role) if target == role => self
                .assigned_to_user_id
                .as_deref()
                .is_none_or(|assignee| assignee == user_id),
            _ => false,
        }
    }
}

/// An owner message plus its AI reply, committed as one unit.
#[derive(Debug, Clone)]
pub struct NewExchange {
    pub session_id: String,
    /// The owner posting the message; re-checked inside the commit.
    pub owner_id: String,
    pub user_message: NewMessage,
    pub reply_message: NewMessage,
    /// Classifier score for the user message.
    pub risk_level: RiskLevel,
    /// Set when the score crosses the escalation threshold on an outlet session.
    pub auto_escalation: Option<OutletEscalation>,
}

/// Result of committing a [`NewExchange`], or of replaying a stored one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeOutcome {
    pub session: OutletSession,
    pub user_message: OutletMessage,
    pub reply_message: OutletMessage,
    pub escalation: Option<OutletEscalation>,
    /// True when a retried `client_message_id` returned the stored exchange.
    pub replayed: bool,
}

/// Result of a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    pub session: OutletSession,
    /// The ledger entry appended by an escalation.
    pub escalation: Option<OutletEscalation>,
    pub status_changed: bool,
}

/// Staff identity used by the staff-listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffScope {
    pub org_id: String,
    pub role: StaffRole,
    pub user_id: String,
}

impl StaffScope {
    /// The scope of a staff requester, or `None` for employees.
    pub fn of(requester: &Requester) -> Option<Self> {
        requester.staff_role().map(|role| Self {
            org_id: requester.org_id.clone(),
            role,
            user_id: requester.user_id.clone(),
        })
    }
}

/// Request to the reply-generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub text: String,
    pub category: Option<String>,
    pub visibility: Visibility,
}

/// Reply-generation result. Only `risk_level` feeds back into the core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReply {
    pub reply: String,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
}

/// Notification kinds emitted toward the inbox.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OutletEscalation,
    OutletResolved,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Payload handed to the notification sink. Never carries message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub org_id: String,
    /// Recipient. `None` addresses everyone holding the target role.
    pub user_id: Option<String>,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub session_id: String,
    pub created_at: String,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Reply,
    Notification,
}
