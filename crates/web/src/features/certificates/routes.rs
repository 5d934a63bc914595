use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{
    download, generate, generate_admin, get_certificate, list_mine, send_email, verify,
};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_mine))
        .route("/generate", post(generate))
        .route("/generate-admin", post(generate_admin))
        .route("/verify/:code", get(verify))
        .route("/:id", get(get_certificate))
        .route("/:id/download", get(download))
        .route("/:id/send-email", post(send_email))
}
