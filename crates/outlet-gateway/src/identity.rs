// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Requester identity carried in headers set by the upstream authenticator.

use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use outlet_core::types::{Requester, Role};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-outlet-user-id";
pub const ORG_ID_HEADER: &str = "x-outlet-org-id";
pub const ROLE_HEADER: &str = "x-outlet-role";

/// The authenticated requester. Missing headers reject with 401, an unknown role with 400.
#[derive(Debug, Clone)]
pub struct Identity(pub Requester);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)?;
        let org_id = header(parts, ORG_ID_HEADER)?;
        let role = header(parts, ROLE_HEADER)?;
        let role = Role::from_str(&role.to_ascii_lowercase())
            .map_err(|_| ApiError::bad_request(format!("unknown role `{role}`")))?;
        Ok(Identity(Requester::new(user_id, org_id, role)))
    }
}

fn header(parts: &Parts, name: &str) -> Result<String, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::unauthorized(format!("missing {name} header")))
}
