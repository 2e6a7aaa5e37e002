// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow layer of the Outlet support channel.
//!
//! [`SessionOrchestrator`] is the only entry point that mutates sessions. It
//! checks who may act, serializes posts per session, calls the reply
//! generator and classifier, hands the result to storage as one atomic write
//! and emits notifications. [`VisibilityResolver`] answers every read.

pub mod locks;
pub mod notify;
pub mod orchestrator;
pub mod resolver;

pub use locks::SessionLocks;
pub use notify::{InboxNotifier, LogNotifier};
pub use orchestrator::{
    EscalateRequest, Limits, ListScope, NewSessionRequest, PostedExchange, SessionDetail,
    SessionOrchestrator,
};
pub use resolver::VisibilityResolver;
