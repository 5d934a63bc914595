use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    dto::{audit::AuditRangeParams, history::GlobalStatistics},
    models::{AuditLogEntry, Enrollment},
};
use uuid::Uuid;

use crate::{AppState, error::WebError};

use super::services;

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform-wide statistics", body = GlobalStatistics),
        (status = 403, description = "Coordinators and administrators only")
    ),
    tag = "admin"
)]
pub async fn global_stats(State(state): State<AppState>) -> Result<Response, WebError> {
    let stats = services::global_stats(state.store.as_ref()).await?;

    Ok(Json(stats).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/audit",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Latest 100 audit entries", body = Vec<AuditLogEntry>)
    ),
    tag = "admin"
)]
pub async fn recent_audit(State(state): State<AppState>) -> Result<Response, WebError> {
    let entries = services::recent_audit(state.store.as_ref()).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/audit/user/{userId}",
    params(("userId" = Uuid, Path, description = "Acting user id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Audit entries by the user", body = Vec<AuditLogEntry>)
    ),
    tag = "admin"
)]
pub async fn audit_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let entries = services::audit_by_user(state.store.as_ref(), user_id).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/audit/range",
    params(AuditRangeParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Audit entries in the range", body = Vec<AuditLogEntry>),
        (status = 400, description = "Invalid range")
    ),
    tag = "admin"
)]
pub async fn audit_between(
    State(state): State<AppState>,
    Query(range): Query<AuditRangeParams>,
) -> Result<Response, WebError> {
    let entries = services::audit_between(state.store.as_ref(), &range).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/audit/action/{action}",
    params(("action" = String, Path, description = "Action tag, e.g. APPROVE_ENROLLMENT")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Audit entries with the action", body = Vec<AuditLogEntry>)
    ),
    tag = "admin"
)]
pub async fn audit_by_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> Result<Response, WebError> {
    let entries = services::audit_by_action(state.store.as_ref(), &action).await?;

    Ok(Json(entries).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/enrollments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every enrollment", body = Vec<Enrollment>)
    ),
    tag = "admin"
)]
pub async fn all_enrollments(State(state): State<AppState>) -> Result<Response, WebError> {
    let enrollments = services::all_enrollments(state.store.as_ref()).await?;

    Ok(Json(enrollments).into_response())
}
