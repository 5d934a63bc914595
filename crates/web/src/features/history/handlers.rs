use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{dto::history::UserStatistics, models::HistoryRecord, services::Actor};
use uuid::Uuid;

use crate::{AppState, error::WebError};

use super::services;

#[utoipa::path(
    get,
    path = "/api/history",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's participation history, newest first", body = Vec<HistoryRecord>)
    ),
    tag = "history"
)]
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let history = services::list_for_user(state.store.as_ref(), actor.user_id).await?;

    Ok(Json(history).into_response())
}

#[utoipa::path(
    get,
    path = "/api/history/stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's statistics", body = UserStatistics)
    ),
    tag = "history"
)]
pub async fn my_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let stats = services::stats_for_user(state.store.as_ref(), actor.user_id).await?;

    Ok(Json(stats).into_response())
}

#[utoipa::path(
    get,
    path = "/api/history/{id}",
    params(("id" = Uuid, Path, description = "History record id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "History record", body = HistoryRecord),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Record not found")
    ),
    tag = "history"
)]
pub async fn get_record(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let record = services::get_record(state.store.as_ref(), &actor, id).await?;

    Ok(Json(record).into_response())
}

#[utoipa::path(
    get,
    path = "/api/history/users/{userId}",
    params(("userId" = Uuid, Path, description = "Volunteer id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Volunteer's history", body = Vec<HistoryRecord>),
        (status = 403, description = "Coordinators and administrators only"),
        (status = 404, description = "User not found")
    ),
    tag = "history"
)]
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let history = services::list_for_other(state.store.as_ref(), user_id).await?;

    Ok(Json(history).into_response())
}

#[utoipa::path(
    get,
    path = "/api/history/users/{userId}/stats",
    params(("userId" = Uuid, Path, description = "Volunteer id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Volunteer's statistics", body = UserStatistics),
        (status = 403, description = "Coordinators and administrators only"),
        (status = 404, description = "User not found")
    ),
    tag = "history"
)]
pub async fn stats_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let stats = services::stats_for_other(state.store.as_ref(), user_id).await?;

    Ok(Json(stats).into_response())
}
