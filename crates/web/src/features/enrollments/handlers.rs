use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    dto::enrollment::{AttendanceRequest, EnrollmentFilterParams, EvaluationRequest},
    models::Enrollment,
    services::Actor,
};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::WebError};

use super::services;

#[utoipa::path(
    post,
    path = "/api/activities/{id}/enroll",
    params(("id" = Uuid, Path, description = "Activity id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrollment created as pending", body = Enrollment),
        (status = 400, description = "Already enrolled, no free slots or activity not open"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Activity not found")
    ),
    tag = "enrollments"
)]
pub async fn enroll(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(activity_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let enrollment =
        services::enroll(state.store.as_ref(), &state.mail, &actor, activity_id).await?;

    Ok(Json(enrollment).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/enrollments/{activityId}",
    params(("activityId" = Uuid, Path, description = "Activity id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrollment cancelled", body = Enrollment),
        (status = 400, description = "Less than 24 hours before the activity starts"),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "enrollments"
)]
pub async fn cancel(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(activity_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let enrollment =
        services::cancel(state.store.as_ref(), &state.mail, &actor, activity_id).await?;

    Ok(Json(enrollment).into_response())
}

#[utoipa::path(
    get,
    path = "/api/enrollments/mine",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's enrollments", body = Vec<Enrollment>)
    ),
    tag = "enrollments"
)]
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let enrollments = services::list_mine(state.store.as_ref(), &actor).await?;

    Ok(Json(enrollments).into_response())
}

#[utoipa::path(
    get,
    path = "/api/enrollments/activity/{activityId}",
    params(
        ("activityId" = Uuid, Path, description = "Activity id"),
        EnrollmentFilterParams
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrollments for the activity", body = Vec<Enrollment>),
        (status = 404, description = "Activity not found")
    ),
    tag = "enrollments"
)]
pub async fn list_for_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
    Query(params): Query<EnrollmentFilterParams>,
) -> Result<Response, WebError> {
    let enrollments =
        services::list_for_activity(state.store.as_ref(), activity_id, params.status).await?;

    Ok(Json(enrollments).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/enrollments/{id}/approve",
    params(("id" = Uuid, Path, description = "Enrollment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrollment approved", body = Enrollment),
        (status = 400, description = "No free slots or illegal transition"),
        (status = 403, description = "Coordinators and administrators only"),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "enrollments"
)]
pub async fn approve(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let enrollment = services::approve(state.store.as_ref(), &state.mail, &actor, id).await?;

    Ok(Json(enrollment).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/enrollments/{id}/reject",
    params(("id" = Uuid, Path, description = "Enrollment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrollment rejected", body = Enrollment),
        (status = 400, description = "Illegal transition"),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "enrollments"
)]
pub async fn reject(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let enrollment = services::reject(state.store.as_ref(), &actor, id).await?;

    Ok(Json(enrollment).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/enrollments/{id}/attendance",
    params(("id" = Uuid, Path, description = "Enrollment id")),
    request_body = AttendanceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Attendance recorded", body = Enrollment),
        (status = 400, description = "Enrollment is not approved"),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "enrollments"
)]
pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<AttendanceRequest>,
) -> Result<Response, WebError> {
    let enrollment =
        services::mark_attendance(state.store.as_ref(), &actor, id, req.attended).await?;

    Ok(Json(enrollment).into_response())
}

#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/evaluate",
    params(("id" = Uuid, Path, description = "Enrollment id")),
    request_body = EvaluationRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Evaluation saved", body = Enrollment),
        (status = 400, description = "Rating out of range or volunteer did not attend"),
        (status = 404, description = "Enrollment not found")
    ),
    tag = "enrollments"
)]
pub async fn evaluate(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<EvaluationRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let enrollment = services::evaluate(
        state.store.as_ref(),
        &actor,
        id,
        req.rating,
        req.comment.as_deref(),
    )
    .await?;

    Ok(Json(enrollment).into_response())
}
