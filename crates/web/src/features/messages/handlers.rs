use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    dto::{message::SendMessageRequest, notification::UnreadCount},
    models::Message,
    services::Actor,
};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::WebError};

use super::services;

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Recipient not found")
    ),
    tag = "messages"
)]
pub async fn send(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let message = services::send(state.store.as_ref(), &actor, &req, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(message)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/messages/inbox",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Received messages, newest first", body = Vec<Message>)),
    tag = "messages"
)]
pub async fn inbox(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let messages = services::inbox(state.store.as_ref(), &actor).await?;

    Ok(Json(messages).into_response())
}

#[utoipa::path(
    get,
    path = "/api/messages/sent",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Sent messages", body = Vec<Message>)),
    tag = "messages"
)]
pub async fn sent(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let messages = services::sent(state.store.as_ref(), &actor).await?;

    Ok(Json(messages).into_response())
}

#[utoipa::path(
    get,
    path = "/api/messages/unread",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Unread received messages", body = Vec<Message>)),
    tag = "messages"
)]
pub async fn unread(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let messages = services::unread(state.store.as_ref(), &actor).await?;

    Ok(Json(messages).into_response())
}

#[utoipa::path(
    get,
    path = "/api/messages/unread/count",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Unread message count", body = UnreadCount)),
    tag = "messages"
)]
pub async fn count_unread(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let unread = services::count_unread(state.store.as_ref(), &actor).await?;

    Ok(Json(UnreadCount { unread }).into_response())
}

#[utoipa::path(
    get,
    path = "/api/messages/archived",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Archived messages", body = Vec<Message>)),
    tag = "messages"
)]
pub async fn archived(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let messages = services::archived(state.store.as_ref(), &actor).await?;

    Ok(Json(messages).into_response())
}

#[utoipa::path(
    get,
    path = "/api/messages/{id}",
    params(("id" = Uuid, Path, description = "Message id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Message", body = Message),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Message not found")
    ),
    tag = "messages"
)]
pub async fn read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let message = services::read(state.store.as_ref(), &actor, id, Utc::now()).await?;

    Ok(Json(message).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/messages/{id}/archive",
    params(("id" = Uuid, Path, description = "Message id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Message archived", body = Message),
        (status = 403, description = "Not the recipient"),
        (status = 404, description = "Message not found")
    ),
    tag = "messages"
)]
pub async fn archive(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let message = services::archive(state.store.as_ref(), &actor, id).await?;

    Ok(Json(message).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    params(("id" = Uuid, Path, description = "Message id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Message not found")
    ),
    tag = "messages"
)]
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete(state.store.as_ref(), &actor, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
