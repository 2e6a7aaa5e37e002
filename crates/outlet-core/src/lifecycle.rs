// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle state machine.
//!
//! ```text
//! Open ──escalate──▶ Escalated ──close──▶ Closed
//!   │                   │  ▲ escalate       (terminal)
//!   │                   │  └──────┘
//!   ├──close──▶ Closed  └──resolve──▶ Resolved
//!   └──resolve──▶ Resolved              (terminal)
//! ```
//!
//! All rules live here as pure functions. Storage backends load the current
//! row, call [`plan`] and [`apply`] inside their write transaction, and persist
//! the result, so no backend re-implements a transition rule.

use crate::error::OutletError;
use crate::types::{
    OutletEscalation, OutletSession, RiskLevel, Sender, SessionKind, SessionStatus,
};

/// The kind of a lifecycle transition, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Escalate,
    Close,
    Resolve,
}

/// A requested lifecycle transition with everything needed to persist it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Append the ledger entry; move `Open` to `Escalated`.
    Escalate(OutletEscalation),
    Close,
    Resolve(Resolution),
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Transition::Escalate(_) => TransitionKind::Escalate,
            Transition::Close => TransitionKind::Close,
            Transition::Resolve(_) => TransitionKind::Resolve,
        }
    }
}

/// Staff resolution details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub note: Option<String>,
    pub resolved_by_user_id: String,
    pub resolved_at: String,
}

/// What a transition will do to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub next: SessionStatus,
    pub appends_ledger: bool,
}

/// The state machine proper: next status for a transition, or why it is refused.
pub fn next_status(
    current: SessionStatus,
    kind: SessionKind,
    transition: TransitionKind,
) -> Result<SessionStatus, OutletError> {
    match transition {
        TransitionKind::Escalate => {
            ensure_staff_kind(kind, "escalated")?;
            ensure_not_terminal(current, "escalated")?;
            // Re-escalation keeps the status already set.
            Ok(SessionStatus::Escalated)
        }
        TransitionKind::Close => match current {
            SessionStatus::Resolved => Err(OutletError::InvalidOperation(
                "session is resolved and cannot be closed".into(),
            )),
            _ => Ok(SessionStatus::Closed),
        },
        TransitionKind::Resolve => {
            ensure_staff_kind(kind, "resolved")?;
            ensure_not_terminal(current, "resolved")?;
            Ok(SessionStatus::Resolved)
        }
    }
}

/// Plan a transition against the session's current state.
pub fn plan(session: &OutletSession, transition: &Transition) -> Result<TransitionPlan, OutletError> {
    let next = next_status(session.status, session.kind, transition.kind())?;
    Ok(TransitionPlan {
        next,
        appends_ledger: matches!(transition, Transition::Escalate(_)),
    })
}

/// Apply a planned transition to the in-memory row. Returns whether the status changed.
pub fn apply(
    session: &mut OutletSession,
    transition: &Transition,
    plan: TransitionPlan,
    now: &str,
) -> bool {
    let changed = session.status != plan.next;
    session.status = plan.next;
    if let Transition::Resolve(resolution) = transition {
        session.resolution_note = resolution.note.clone();
        session.resolved_by_user_id = Some(resolution.resolved_by_user_id.clone());
        session.resolved_at = Some(resolution.resolved_at.clone());
    }
    if changed || plan.appends_ledger {
        session.updated_at = now.to_string();
    }
    changed
}

/// Refuse appends to terminal sessions.
pub fn ensure_accepts_messages(session: &OutletSession) -> Result<(), OutletError> {
    ensure_not_terminal(session.status, "written to")
}

/// Staff replies need an outlet session that still accepts messages.
pub fn ensure_accepts_staff_reply(session: &OutletSession) -> Result<(), OutletError> {
    ensure_staff_kind(session.kind, "answered by staff")?;
    ensure_accepts_messages(session)
}

/// Update the denormalized summary for one appended message.
pub fn record_message(session: &mut OutletSession, sender: Sender, at: &str) {
    session.message_count += 1;
    session.last_sender = Some(sender);
    session.last_message_at = Some(at.to_string());
    session.updated_at = at.to_string();
}

/// Raise the session's risk level. Never lowers it.
pub fn raise_risk(session: &mut OutletSession, level: RiskLevel) {
    session.risk_level = session.risk_level.max(level);
}

fn ensure_staff_kind(kind: SessionKind, verb: &str) -> Result<(), OutletError> {
    if kind.admits_staff() {
        Ok(())
    } else {
        Err(OutletError::InvalidOperation(format!(
            "{kind} sessions cannot be {verb}"
        )))
    }
}

fn ensure_not_terminal(status: SessionStatus, verb: &str) -> Result<(), OutletError> {
    if status.is_terminal() {
        Err(OutletError::InvalidOperation(format!(
            "session is {status} and cannot be {verb}"
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::{Requester, Role, StaffRole, Visibility};

    fn session(kind: SessionKind) -> OutletSession {
        let owner = Requester::new("u-1", "org-1", Role::Employee);
        OutletSession::new(&owner, None, Visibility::Private, kind)
    }

    fn escalate(session: &OutletSession) -> Transition {
        Transition::Escalate(OutletEscalation::new(
            session.id.clone(),
            StaffRole::Manager,
            None,
            None,
            Some(session.user_id.clone()),
        ))
    }

    fn resolve() -> Transition {
        Transition::Resolve(Resolution {
            note: Some("Connected with EAP".into()),
            resolved_by_user_id: "admin-1".into(),
            resolved_at: "2026-01-01T00:00:00.000Z".into(),
        })
    }

    #[test]
    fn open_session_escalates() {
        let mut s = session(SessionKind::Outlet);
        let t = escalate(&s);
        let p = plan(&s, &t).unwrap();
        assert_eq!(p.next, SessionStatus::Escalated);
        assert!(p.appends_ledger);
        assert!(apply(&mut s, &t, p, "2026-01-01T00:00:01.000Z"));
        assert_eq!(s.status, SessionStatus::Escalated);
    }

    #[test]
    fn re_escalation_appends_without_status_change() {
        let mut s = session(SessionKind::Outlet);
        s.status = SessionStatus::Escalated;
        let t = escalate(&s);
        let p = plan(&s, &t).unwrap();
        assert!(p.appends_ledger);
        assert!(!apply(&mut s, &t, p, "2026-01-01T00:00:01.000Z"));
        assert_eq!(s.status, SessionStatus::Escalated);
        assert_eq!(s.updated_at, "2026-01-01T00:00:01.000Z");
    }

    #[test]
    fn close_is_idempotent() {
        let mut s = session(SessionKind::Outlet);
        let p = plan(&s, &Transition::Close).unwrap();
        assert!(apply(&mut s, &Transition::Close, p, "t1"));
        let updated = s.updated_at.clone();
        let p = plan(&s, &Transition::Close).unwrap();
        assert!(!apply(&mut s, &Transition::Close, p, "t2"));
        assert_eq!(s.status, SessionStatus::Closed);
        assert_eq!(s.updated_at, updated);
    }

    #[test]
    fn closing_a_resolved_session_is_invalid() {
        let mut s = session(SessionKind::Outlet);
        s.status = SessionStatus::Resolved;
        let err = plan(&s, &Transition::Close).unwrap_err();
        assert!(matches!(err, OutletError::InvalidOperation(_)));
    }

    #[test]
    fn resolve_records_resolution() {
        let mut s = session(SessionKind::Outlet);
        let t = resolve();
        let p = plan(&s, &t).unwrap();
        apply(&mut s, &t, p, "2026-01-01T00:00:00.000Z");
        assert_eq!(s.status, SessionStatus::Resolved);
        assert_eq!(s.resolution_note.as_deref(), Some("Connected with EAP"));
        assert_eq!(s.resolved_by_user_id.as_deref(), Some("admin-1"));
        assert!(s.resolved_at.is_some());
    }

    #[test]
    fn confessional_refuses_escalate_and_resolve() {
        let s = session(SessionKind::Confessional);
        assert!(matches!(
            plan(&s, &escalate(&s)),
            Err(OutletError::InvalidOperation(_))
        ));
        assert!(matches!(
            plan(&s, &resolve()),
            Err(OutletError::InvalidOperation(_))
        ));
        // The owner can still close their journal.
        assert!(plan(&s, &Transition::Close).is_ok());
    }

    #[test]
    fn staff_reply_rules() {
        let mut s = session(SessionKind::Outlet);
        assert!(ensure_accepts_staff_reply(&s).is_ok());
        s.status = SessionStatus::Closed;
        assert!(ensure_accepts_staff_reply(&s).is_err());
        let c = session(SessionKind::Confessional);
        assert!(matches!(
            ensure_accepts_staff_reply(&c),
            Err(OutletError::InvalidOperation(_))
        ));
    }

    #[test]
    fn record_message_updates_summary() {
        let mut s = session(SessionKind::Outlet);
        record_message(&mut s, Sender::User, "t1");
        record_message(&mut s, Sender::Ai, "t2");
        assert_eq!(s.message_count, 2);
        assert_eq!(s.last_sender, Some(Sender::Ai));
        assert_eq!(s.last_message_at.as_deref(), Some("t2"));
    }

    fn any_kind() -> impl Strategy<Value = SessionKind> {
        prop_oneof![Just(SessionKind::Outlet), Just(SessionKind::Confessional)]
    }

    fn any_transition() -> impl Strategy<Value = TransitionKind> {
        prop_oneof![
            Just(TransitionKind::Escalate),
            Just(TransitionKind::Close),
            Just(TransitionKind::Resolve),
        ]
    }

    proptest! {
        #[test]
        fn terminal_states_stay_terminal(
            kind in any_kind(),
            steps in prop::collection::vec(any_transition(), 0..24),
        ) {
            let mut status = SessionStatus::Open;
            for step in steps {
                let was_terminal = status.is_terminal();
                if let Ok(next) = next_status(status, kind, step) {
                    if was_terminal {
                        // Only closing an already closed session succeeds, as a no-op.
                        prop_assert_eq!(status, SessionStatus::Closed);
                        prop_assert_eq!(next, SessionStatus::Closed);
                    }
                    status = next;
                }
            }
        }

        #[test]
        fn confessional_never_escalates_or_resolves(
            steps in prop::collection::vec(any_transition(), 0..24),
        ) {
            let mut status = SessionStatus::Open;
            for step in steps {
                let result = next_status(status, SessionKind::Confessional, step);
                if step != TransitionKind::Close {
                    prop_assert!(matches!(result, Err(OutletError::InvalidOperation(_))));
                }
                if let Ok(next) = result {
                    status = next;
                }
                prop_assert!(status != SessionStatus::Escalated);
                prop_assert!(status != SessionStatus::Resolved);
            }
        }

        #[test]
        fn risk_never_decreases(levels in prop::collection::vec(0u8..=2, 0..32)) {
            let mut s = session(SessionKind::Outlet);
            let mut previous = s.risk_level;
            for level in levels {
                raise_risk(&mut s, level);
                prop_assert!(s.risk_level >= previous);
                previous = s.risk_level;
            }
        }
    }
}
