// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-access rules for sessions.
//!
//! A requester may read a session through exactly one of three paths, checked
//! in order: ownership, the session's visibility ceiling, or an escalation
//! ledger entry naming the requester's role (and, if assigned, the requester).
//! Admins outrank managers on both staff paths. The last two paths only exist for staff of the session's own org on
//! `outlet` sessions. Escalation access ignores the visibility field and
//! survives the session being closed or resolved.

use serde::Serialize;

use crate::types::{OutletEscalation, OutletSession, Requester, StaffRole};

/// Which rule granted read access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPath {
    Owner,
    Visibility,
    Escalation,
}

/// The staff role through which `requester` could reach `session` at all.
///
/// `None` for non-staff, staff of another org, and every confessional session.
pub fn staff_role_for(session: &OutletSession, requester: &Requester) -> Option<StaffRole> {
    let role = requester.staff_role()?;
    if session.kind.admits_staff() && session.org_id == requester.org_id {
        Some(role)
    } else {
        None
    }
}

/// Path 2: the visibility ceiling admits the requester's staff role.
pub fn visibility_grants(session: &OutletSession, requester: &Requester) -> bool {
    staff_role_for(session, requester).is_some_and(|role| session.visibility.permits(role))
}

/// Path 3: some ledger entry grants the requester's staff role.
pub fn escalation_grants(
    session: &OutletSession,
    requester: &Requester,
    ledger: &[OutletEscalation],
) -> bool {
    staff_role_for(session, requester).is_some_and(|role| {
        ledger
            .iter()
            .any(|entry| entry.session_id == session.id && entry.grants(role, &requester.user_id))
    })
}

/// Resolve read access against a fully loaded ledger.
pub fn resolve(
    session: &OutletSession,
    requester: &Requester,
    ledger: &[OutletEscalation],
) -> Option<AccessPath> {
    if session.is_owned_by(requester) {
        Some(AccessPath::Owner)
    } else if visibility_grants(session, requester) {
        Some(AccessPath::Visibility)
    } else if escalation_grants(session, requester, ledger) {
        Some(AccessPath::Escalation)
    } else {
        None
    }
}
