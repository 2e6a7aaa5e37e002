// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the session API.

use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use outlet_core::HealthStatus;
use outlet_core::types::{
    Notification, OutletEscalation, OutletSession, SessionKind, SessionStatus, StaffRole,
    Visibility,
};
use outlet_session::{EscalateRequest, ListScope, NewSessionRequest, SessionDetail};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::server::GatewayState;

/// Request body for POST /sessions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionBody {
    #[serde(default)]
    pub category: Option<String>,
    pub visibility: Visibility,
    #[serde(default)]
    pub kind: SessionKind,
}

/// Query string for GET /sessions.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub scope: Option<ScopeParam>,
    #[serde(default)]
    pub status: Option<SessionStatus>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeParam {
    Mine,
    Staff,
}

impl From<ScopeParam> for ListScope {
    fn from(scope: ScopeParam) -> Self {
        match scope {
            ScopeParam::Mine => ListScope::Mine,
            ScopeParam::Staff => ListScope::Staff,
        }
    }
}

/// Request body for POST /sessions/{id}/messages.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageBody {
    pub content: String,
    #[serde(default)]
    pub client_message_id: Option<String>,
}

/// Request body for POST /sessions/{id}/replies.
#[derive(Debug, Deserialize)]
pub struct StaffReplyBody {
    pub content: String,
}

/// Request body for POST /sessions/{id}/escalate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalateBody {
    pub to_role: StaffRole,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for POST /sessions/{id}/resolve.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveBody {
    #[serde(default)]
    pub resolution_note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<OutletSession>,
}

#[derive(Debug, Serialize)]
pub struct EscalationListResponse {
    pub escalations: Vec<OutletEscalation>,
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub storage: String,
}

/// POST /sessions
pub async fn create_session(
    State(state): State<GatewayState>,
    Identity(requester): Identity,
    payload: Result<Json<CreateSessionBody>, JsonRejection>,
) -> Result<(StatusCode, Json<OutletSession>), ApiError> {
    let Json(body) = payload?;
    let session = state
        .orchestrator
        .create_session(
            &requester,
            NewSessionRequest {
                category: body.category,
                visibility: body.visibility,
                kind: body.kind,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /sessions?scope=mine|staff&status=...
pub async fn list_sessions(
    State(state): State<GatewayState>,
    Identity(requester): Identity,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let Query(query) = query?;
    let scope = query.scope.map(ListScope::from).unwrap_or_default();
    let sessions = state
        .orchestrator
        .list_sessions(&requester, scope, query.status)
        .await?;
    Ok(Json(SessionListResponse { sessions }))
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<GatewayState>,
    Identity(requester): Identity,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, ApiError> {
    Ok(Json(state.orchestrator.get_session(&requester, &id).await?))
}

/// POST /sessions/{id}/messages
///
/// 201 for a new exchange, 200 when a retried `clientMessageId` replays one.
pub async fn post_message(
    State(state): State<GatewayState>,
    Identity(requester): Identity,
    Path(id): Path<String>,
    payload: Result<Json<PostMessageBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let posted = state
        .orchestrator
        .post_message(&requester, &id, &body.content, body.client_message_id)
        .await?;
    let status = if posted.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(posted)).into_response())
}

/// POST /sessions/{id}/replies
pub async fn staff_reply(
    State(state): State<GatewayState>,
    Identity(requester): Identity,
    Path(id): Path<String>,
    payload: Result<Json<StaffReplyBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload?;
    let message = state
        .orchestrator
        .staff_reply(&requester, &id, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)).into_response())
}

/// POST /sessions/{id}/escalate
pub async fn escalate(
    State(state): State<GatewayState>,
    Identity(requester): Identity,
    Path(id): Path<String>,
    payload: Result<Json<EscalateBody>, JsonRejection>,
) -> Result<Json<OutletSession>, ApiError> {
    let Json(body) = payload?;
    let session = state
        .orchestrator
        .escalate(
            &requester,
            &id,
            EscalateRequest {
                to_role: body.to_role,
                assigned_to: body.assigned_to,
                reason: body.reason,
            },
        )
        .await?;
    Ok(Json(session))
}

/// POST /sessions/{id}/close
pub async fn close(
    State(state): State<GatewayState>,
    Identity(requester): Identity,
    Path(id): Path<String>,
) -> Result<Json<OutletSession>, ApiError> {
    Ok(Json(state.orchestrator.close(&requester, &id).await?))
}

/// POST /sessions/{id}/resolve
///
/// The body is optional; an empty request resolves without a note.
pub async fn resolve(
    State(state): State<GatewayState>,
    Identity(requester): Identity,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<OutletSession>, ApiError> {
    let body: ResolveBody = if body.iter().all(u8::is_ascii_whitespace) {
        ResolveBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("invalid resolve body: {e}")))?
    };
    let session = state
        .orchestrator
        .resolve(&requester, &id, body.resolution_note)
        .await?;
    Ok(Json(session))
}

/// GET /sessions/{id}/escalations
pub async fn list_escalations(
    State(state): State<GatewayState>,
    Identity(requester): Identity,
    Path(id): Path<String>,
) -> Result<Json<EscalationListResponse>, ApiError> {
    let escalations = state.orchestrator.list_escalations(&requester, &id).await?;
    Ok(Json(EscalationListResponse { escalations }))
}

/// GET /notifications
pub async fn list_notifications(
    State(state): State<GatewayState>,
    Identity(requester): Identity,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let notifications = state.orchestrator.list_notifications(&requester).await?;
    Ok(Json(NotificationListResponse { notifications }))
}

/// GET /health
///
/// Unauthenticated. 503 when storage is unhealthy.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let uptime_secs = state.health.start_time.elapsed().as_secs();
    let (status, storage) = match state.orchestrator.storage().health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {e}")),
    };
    let body = HealthResponse {
        status: if status == StatusCode::OK { "ok" } else { "unavailable" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs,
        storage,
    };
    (status, Json(body)).into_response()
}
