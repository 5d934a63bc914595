use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use storage::dto::{
    auth::{
        AuthResponse, LoginRequest, RecoveryRequest, RegisterRequest, ResetPasswordRequest,
        ResetTokenResponse, VerifyRecoveryCodeRequest,
    },
    user::UserResponse,
};
use validator::Validate;

use crate::{AppState, error::WebError};

use super::services;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Volunteer registered", body = AuthResponse),
        (status = 400, description = "Validation error or email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let (user, token) =
        services::register(state.store.as_ref(), &state.tokens, &req, Utc::now()).await?;

    let response = AuthResponse {
        token,
        user: UserResponse::from(user),
        message: "Registro exitoso".to_string(),
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Validation error or deactivated account"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let (user, token) =
        services::login(state.store.as_ref(), &state.tokens, &req, Utc::now()).await?;

    let response = AuthResponse {
        token,
        user: UserResponse::from(user),
        message: "Inicio de sesión exitoso".to_string(),
    };
    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/recover-password",
    request_body = RecoveryRequest,
    responses(
        (status = 202, description = "Recovery code emailed"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "No account for this email")
    ),
    tag = "auth"
)]
pub async fn request_recovery(
    State(state): State<AppState>,
    Json(req): Json<RecoveryRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    services::request_recovery(state.store.as_ref(), &state.mail, &req, Utc::now()).await?;

    let body = json!({ "message": "Se ha enviado un correo con las instrucciones" });
    Ok((StatusCode::ACCEPTED, Json(body)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-code",
    request_body = VerifyRecoveryCodeRequest,
    responses(
        (status = 200, description = "Code accepted, reset token issued", body = ResetTokenResponse),
        (status = 400, description = "Wrong or expired code"),
        (status = 404, description = "No account for this email")
    ),
    tag = "auth"
)]
pub async fn verify_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyRecoveryCodeRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let token = services::verify_recovery_code(state.store.as_ref(), &req, Utc::now()).await?;

    let response = ResetTokenResponse {
        token,
        message: "Código verificado".to_string(),
    };
    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 400, description = "Invalid or expired reset token")
    ),
    tag = "auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    services::reset_password(state.store.as_ref(), &req, Utc::now()).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
