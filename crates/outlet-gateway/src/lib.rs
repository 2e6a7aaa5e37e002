// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Outlet session API.
//!
//! Authentication is delegated: an upstream authenticator presents the shared
//! bearer token and forwards the requester's identity in `x-outlet-*`
//! headers. Every handler is a thin mapping onto [`SessionOrchestrator`]
//! operations, with domain errors translated to status codes in [`error`].
//!
//! [`SessionOrchestrator`]: outlet_session::SessionOrchestrator

pub mod auth;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod server;

pub use error::ApiError;
pub use identity::{Identity, ORG_ID_HEADER, ROLE_HEADER, USER_ID_HEADER};
pub use server::{GatewayState, ServerConfig, build_router, start_server};
