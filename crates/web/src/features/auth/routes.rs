use axum::{Router, routing::post};

use super::handlers::{login, register, request_recovery, reset_password, verify_code};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/recover-password", post(request_recovery))
        .route("/verify-code", post(verify_code))
        .route("/reset-password", post(reset_password))
}
