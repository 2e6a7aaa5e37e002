// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Outlet integration tests.
//!
//! Provides mock collaborators and a harness over a temp SQLite database, so
//! orchestrator and gateway tests run without network services.
//!
//! # Components
//!
//! - [`MockReplyProvider`] - Reply generator with queued replies and failure injection
//! - [`RecordingNotifier`] - Notification sink that captures every notice
//! - [`TestHarness`] - Orchestrator wired to temp storage and both mocks

pub mod harness;
pub mod mock_notifier;
pub mod mock_reply;

pub use harness::{TEST_ORG, TestHarness};
pub use mock_notifier::RecordingNotifier;
pub use mock_reply::MockReplyProvider;
