use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    dto::activity::{
        ActivitySearchParams, ChangeStatusRequest, CreateActivityRequest, DateRangeParams,
        UpdateActivityRequest,
    },
    models::{Activity, ActivityStatus},
    services::Actor,
};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::WebError};

use super::services;

#[utoipa::path(
    get,
    path = "/api/activities",
    responses(
        (status = 200, description = "All activities", body = Vec<Activity>)
    ),
    tag = "activities"
)]
pub async fn list_activities(State(state): State<AppState>) -> Result<Response, WebError> {
    let activities = services::list_activities(state.store.as_ref()).await?;

    Ok(Json(activities).into_response())
}

#[utoipa::path(
    get,
    path = "/api/activities/available",
    responses(
        (status = 200, description = "Upcoming activities with free slots", body = Vec<Activity>)
    ),
    tag = "activities"
)]
pub async fn list_available(State(state): State<AppState>) -> Result<Response, WebError> {
    let activities = services::list_available(state.store.as_ref(), Utc::now()).await?;

    Ok(Json(activities).into_response())
}

#[utoipa::path(
    get,
    path = "/api/activities/search",
    params(ActivitySearchParams),
    responses(
        (status = 200, description = "Activities matching title and/or location", body = Vec<Activity>)
    ),
    tag = "activities"
)]
pub async fn search_activities(
    State(state): State<AppState>,
    Query(params): Query<ActivitySearchParams>,
) -> Result<Response, WebError> {
    let activities = services::search(
        state.store.as_ref(),
        params.title.as_deref(),
        params.location.as_deref(),
    )
    .await?;

    Ok(Json(activities).into_response())
}

#[utoipa::path(
    get,
    path = "/api/activities/range",
    params(DateRangeParams),
    responses(
        (status = 200, description = "Activities starting in the range", body = Vec<Activity>),
        (status = 400, description = "Invalid range")
    ),
    tag = "activities"
)]
pub async fn list_in_range(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> Result<Response, WebError> {
    params
        .validate()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let activities = services::list_in_range(state.store.as_ref(), params.from, params.to).await?;

    Ok(Json(activities).into_response())
}

#[utoipa::path(
    get,
    path = "/api/activities/status/{status}",
    params(("status" = ActivityStatus, Path, description = "Activity status")),
    responses(
        (status = 200, description = "Activities with the status", body = Vec<Activity>)
    ),
    tag = "activities"
)]
pub async fn list_by_status(
    State(state): State<AppState>,
    Path(status): Path<ActivityStatus>,
) -> Result<Response, WebError> {
    let activities = services::list_by_status(state.store.as_ref(), status).await?;

    Ok(Json(activities).into_response())
}

#[utoipa::path(
    get,
    path = "/api/activities/mine",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Activities coordinated by the caller", body = Vec<Activity>),
        (status = 403, description = "Coordinators and administrators only")
    ),
    tag = "activities"
)]
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let activities = services::list_mine(state.store.as_ref(), &actor).await?;

    Ok(Json(activities).into_response())
}

#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity id")),
    responses(
        (status = 200, description = "Activity found", body = Activity),
        (status = 404, description = "Activity not found")
    ),
    tag = "activities"
)]
pub async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let activity = services::get_activity(state.store.as_ref(), id).await?;

    Ok(Json(activity).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities",
    request_body = CreateActivityRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Activity created", body = Activity),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Coordinators and administrators only")
    ),
    tag = "activities"
)]
pub async fn create_activity(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateActivityRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    req.validate_schedule()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let activity = services::create_activity(
        state.store.as_ref(),
        &state.mail,
        &actor,
        &req,
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(activity)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity id")),
    request_body = UpdateActivityRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Activity updated", body = Activity),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Activity not found")
    ),
    tag = "activities"
)]
pub async fn update_activity(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateActivityRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    req.validate_schedule()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let activity =
        services::update_activity(state.store.as_ref(), &actor, id, &req, Utc::now()).await?;

    Ok(Json(activity).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/activities/{id}/status",
    params(("id" = Uuid, Path, description = "Activity id")),
    request_body = ChangeStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status changed", body = Activity),
        (status = 404, description = "Activity not found")
    ),
    tag = "activities"
)]
pub async fn change_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Response, WebError> {
    let activity = services::change_status(state.store.as_ref(), &actor, id, req.status).await?;

    Ok(Json(activity).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Activity deleted"),
        (status = 404, description = "Activity not found")
    ),
    tag = "activities"
)]
pub async fn delete_activity(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_activity(state.store.as_ref(), &actor, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
