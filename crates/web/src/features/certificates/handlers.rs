use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use storage::{
    dto::certificate::{AdminGenerateCertificateParams, GenerateCertificateParams},
    models::Certificate,
    services::{Actor, certificate_pdf},
};
use uuid::Uuid;

use crate::{AppState, error::WebError};

use super::services;

#[utoipa::path(
    post,
    path = "/api/certificates/generate",
    params(GenerateCertificateParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Certificate issued", body = Certificate),
        (status = 400, description = "Not attended, not approved or already issued"),
        (status = 404, description = "No enrollment for the activity")
    ),
    tag = "certificates"
)]
pub async fn generate(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<GenerateCertificateParams>,
) -> Result<Response, WebError> {
    let certificate =
        services::generate_own(state.store.as_ref(), &actor, params.activity_id).await?;

    Ok(Json(certificate).into_response())
}

#[utoipa::path(
    post,
    path = "/api/certificates/generate-admin",
    params(AdminGenerateCertificateParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Certificate issued", body = Certificate),
        (status = 400, description = "Not attended, not approved or already issued"),
        (status = 403, description = "Coordinators and administrators only"),
        (status = 404, description = "No enrollment for the pair")
    ),
    tag = "certificates"
)]
pub async fn generate_admin(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<AdminGenerateCertificateParams>,
) -> Result<Response, WebError> {
    let certificate = services::generate_for(
        state.store.as_ref(),
        &actor,
        params.user_id,
        params.activity_id,
    )
    .await?;

    Ok(Json(certificate).into_response())
}

#[utoipa::path(
    get,
    path = "/api/certificates",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's certificates", body = Vec<Certificate>)
    ),
    tag = "certificates"
)]
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, WebError> {
    let certificates = services::list_mine(state.store.as_ref(), &actor).await?;

    Ok(Json(certificates).into_response())
}

#[utoipa::path(
    get,
    path = "/api/certificates/{id}",
    params(("id" = Uuid, Path, description = "Certificate id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Certificate found", body = Certificate),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Certificate not found")
    ),
    tag = "certificates"
)]
pub async fn get_certificate(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let certificate = services::get(state.store.as_ref(), &actor, id).await?;

    Ok(Json(certificate).into_response())
}

#[utoipa::path(
    get,
    path = "/api/certificates/{id}/download",
    params(("id" = Uuid, Path, description = "Certificate id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "PDF document served as certificado.pdf"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Certificate not found")
    ),
    tag = "certificates"
)]
pub async fn download(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let pdf = services::download(state.store.as_ref(), &actor, id).await?;

    let disposition = format!("attachment; filename=\"{}\"", certificate_pdf::FILENAME);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, certificate_pdf::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/certificates/{id}/send-email",
    params(("id" = Uuid, Path, description = "Certificate id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 202, description = "Email queued"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Certificate not found")
    ),
    tag = "certificates"
)]
pub async fn send_email(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::send_by_email(state.store.as_ref(), &state.mail, &actor, id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Certificado enviado por correo" })),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/certificates/verify/{code}",
    params(("code" = String, Path, description = "Verification code")),
    responses(
        (status = 200, description = "Certificate is genuine", body = Certificate),
        (status = 404, description = "Unknown code")
    ),
    tag = "certificates"
)]
pub async fn verify(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, WebError> {
    let certificate = services::verify(state.store.as_ref(), &code).await?;

    Ok(Json(certificate).into_response())
}
