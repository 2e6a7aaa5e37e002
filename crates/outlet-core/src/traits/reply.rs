// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply-generation collaborator.

use async_trait::async_trait;

use crate::error::OutletError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GeneratedReply, ReplyRequest};

/// Produces the AI reply appended after every owner message.
///
/// The reply text is opaque to the core. Implementations must report failure
/// as [`OutletError::Dependency`]; a failed call is never read as "no risk".
#[async_trait]
pub trait ReplyProvider: PluginAdapter {
    async fn generate(&self, request: ReplyRequest) -> Result<GeneratedReply, OutletError>;
}
