use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    dto::user::{
        ChangePasswordRequest, ChangeRoleRequest, SetActiveRequest, UpdateProfileRequest,
        UserResponse,
    },
    models::Role,
    services::Actor,
};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::WebError};

use super::services;

fn to_responses(users: Vec<storage::models::User>) -> Vec<UserResponse> {
    users.into_iter().map(UserResponse::from).collect()
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users"
)]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let user = services::get_user(state.store.as_ref(), actor.user_id).await?;

    Ok(Json(UserResponse::from(user)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users"
)]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let user = services::update_profile(state.store.as_ref(), &actor, &req, Utc::now()).await?;

    Ok(Json(UserResponse::from(user)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/users/me/password",
    request_body = ChangePasswordRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users"
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    services::change_password(state.store.as_ref(), &actor, &req, Utc::now()).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 403, description = "Administrators only")
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Response, WebError> {
    let users = services::list_users(state.store.as_ref()).await?;

    Ok(Json(to_responses(users)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/users/role/{role}",
    params(("role" = Role, Path, description = "Role to filter by")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users with the role", body = Vec<UserResponse>),
        (status = 403, description = "Coordinators and administrators only")
    ),
    tag = "users"
)]
pub async fn list_by_role(
    State(state): State<AppState>,
    Path(role): Path<Role>,
) -> Result<Response, WebError> {
    let users = services::list_by_role(state.store.as_ref(), role).await?;

    Ok(Json(to_responses(users)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let user = services::get_user(state.store.as_ref(), id).await?;

    Ok(Json(UserResponse::from(user)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = ChangeRoleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn change_role(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Response, WebError> {
    let user =
        services::change_role(state.store.as_ref(), &actor, id, req.role, Utc::now()).await?;

    Ok(Json(UserResponse::from(user)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/active",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = SetActiveRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Activation changed", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn set_active(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Response, WebError> {
    let user =
        services::set_active(state.store.as_ref(), &actor, id, req.active, Utc::now()).await?;

    Ok(Json(UserResponse::from(user)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_user(state.store.as_ref(), &actor, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
