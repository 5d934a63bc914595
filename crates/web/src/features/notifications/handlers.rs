use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use storage::{
    dto::notification::{AnnouncementRequest, UnreadCount},
    models::Notification,
    services::Actor,
};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::WebError};

use super::services;

#[utoipa::path(
    get,
    path = "/api/notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's notifications, newest first", body = Vec<Notification>)
    ),
    tag = "notifications"
)]
pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let notifications = services::list(state.store.as_ref(), &actor).await?;

    Ok(Json(notifications).into_response())
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread notifications", body = Vec<Notification>)
    ),
    tag = "notifications"
)]
pub async fn list_unread(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let notifications = services::list_unread(state.store.as_ref(), &actor).await?;

    Ok(Json(notifications).into_response())
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread/count",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread notification count", body = UnreadCount)
    ),
    tag = "notifications"
)]
pub async fn count_unread(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let unread = services::count_unread(state.store.as_ref(), &actor).await?;

    Ok(Json(UnreadCount { unread }).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 403, description = "Not the addressee"),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::mark_read(state.store.as_ref(), &actor, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    patch,
    path = "/api/notifications/read-all",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All notifications marked as read")
    ),
    tag = "notifications"
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let updated = services::mark_all_read(state.store.as_ref(), &actor).await?;

    Ok(Json(json!({ "updated": updated })).into_response())
}

#[utoipa::path(
    post,
    path = "/api/notifications/announcements",
    request_body = AnnouncementRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Announcement delivered"),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Coordinators and administrators only")
    ),
    tag = "notifications"
)]
pub async fn announce(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<AnnouncementRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let delivered = services::announce(state.store.as_ref(), &state.mail, &actor, &req).await;

    Ok(Json(json!({ "delivered": delivered })).into_response())
}
