use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::json;
use storage::{Store, services::mail::EmailQueue};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod features;
pub mod middleware;
pub mod password;
pub mod token;
pub mod workers;

use features::{
    activities, admin, auth, certificates, enrollments, history, messages, notifications, users,
};
use token::TokenSigner;

/// Shared handles given to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mail: EmailQueue,
    pub tokens: TokenSigner,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, mail: EmailQueue, tokens: TokenSigner) -> Self {
        Self {
            store,
            mail,
            tokens,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::request_recovery,
        auth::handlers::verify_code,
        auth::handlers::reset_password,
        users::handlers::get_me,
        users::handlers::update_me,
        users::handlers::change_password,
        users::handlers::list_users,
        users::handlers::list_by_role,
        users::handlers::get_user,
        users::handlers::change_role,
        users::handlers::set_active,
        users::handlers::delete_user,
        activities::handlers::list_activities,
        activities::handlers::list_available,
        activities::handlers::search_activities,
        activities::handlers::list_in_range,
        activities::handlers::list_by_status,
        activities::handlers::list_mine,
        activities::handlers::get_activity,
        activities::handlers::create_activity,
        activities::handlers::update_activity,
        activities::handlers::change_status,
        activities::handlers::delete_activity,
        enrollments::handlers::enroll,
        enrollments::handlers::cancel,
        enrollments::handlers::list_mine,
        enrollments::handlers::list_for_activity,
        enrollments::handlers::approve,
        enrollments::handlers::reject,
        enrollments::handlers::mark_attendance,
        enrollments::handlers::evaluate,
        certificates::handlers::generate,
        certificates::handlers::generate_admin,
        certificates::handlers::list_mine,
        certificates::handlers::get_certificate,
        certificates::handlers::download,
        certificates::handlers::send_email,
        certificates::handlers::verify,
        history::handlers::list_mine,
        history::handlers::my_stats,
        history::handlers::get_record,
        history::handlers::list_for_user,
        history::handlers::stats_for_user,
        notifications::handlers::list,
        notifications::handlers::list_unread,
        notifications::handlers::count_unread,
        notifications::handlers::mark_read,
        notifications::handlers::mark_all_read,
        notifications::handlers::announce,
        messages::handlers::send,
        messages::handlers::inbox,
        messages::handlers::sent,
        messages::handlers::unread,
        messages::handlers::count_unread,
        messages::handlers::archived,
        messages::handlers::read,
        messages::handlers::archive,
        messages::handlers::delete,
        admin::handlers::global_stats,
        admin::handlers::recent_audit,
        admin::handlers::audit_by_user,
        admin::handlers::audit_between,
        admin::handlers::audit_by_action,
        admin::handlers::all_enrollments,
    ),
    components(
        schemas(
            storage::dto::auth::RegisterRequest,
            storage::dto::auth::LoginRequest,
            storage::dto::auth::AuthResponse,
            storage::dto::auth::RecoveryRequest,
            storage::dto::auth::VerifyRecoveryCodeRequest,
            storage::dto::auth::ResetTokenResponse,
            storage::dto::auth::ResetPasswordRequest,
            storage::dto::user::UserResponse,
            storage::dto::user::UpdateProfileRequest,
            storage::dto::user::ChangePasswordRequest,
            storage::dto::user::ChangeRoleRequest,
            storage::dto::user::SetActiveRequest,
            storage::dto::activity::CreateActivityRequest,
            storage::dto::activity::UpdateActivityRequest,
            storage::dto::activity::ChangeStatusRequest,
            storage::dto::enrollment::AttendanceRequest,
            storage::dto::enrollment::EvaluationRequest,
            storage::dto::notification::AnnouncementRequest,
            storage::dto::notification::UnreadCount,
            storage::dto::message::SendMessageRequest,
            storage::dto::history::UserStatistics,
            storage::dto::history::GlobalStatistics,
            storage::models::Role,
            storage::models::Activity,
            storage::models::ActivityStatus,
            storage::models::Enrollment,
            storage::models::EnrollmentStatus,
            storage::models::Certificate,
            storage::models::HistoryRecord,
            storage::models::Notification,
            storage::models::NotificationKind,
            storage::models::Message,
            storage::models::AuditLogEntry,
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Profiles and user administration"),
        (name = "activities", description = "Activity catalog"),
        (name = "enrollments", description = "Enrollment lifecycle"),
        (name = "certificates", description = "Participation certificates"),
        (name = "history", description = "Participation history and statistics"),
        (name = "notifications", description = "In-app notifications"),
        (name = "messages", description = "Internal messaging"),
        (name = "admin", description = "Dashboard and audit trail"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("HMAC token")
                        .build(),
                ),
            )
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::routes::routes())
        .nest("/users", users::routes::routes())
        .nest(
            "/activities",
            activities::routes::routes().merge(enrollments::routes::activity_routes()),
        )
        .nest("/enrollments", enrollments::routes::routes())
        .nest("/certificates", certificates::routes::routes())
        .nest("/history", history::routes::routes())
        .nest("/notifications", notifications::routes::routes())
        .nest("/messages", messages::routes::routes())
        .nest("/admin", admin::routes::routes())
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::gate,
        ))
}

pub fn build_router(state: AppState, cors_allow_any_origin: bool) -> Router {
    let cors = if cors_allow_any_origin {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes(state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
