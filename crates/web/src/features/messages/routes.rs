use axum::{
    Router,
    routing::{get, patch, post},
};

use super::handlers::{archive, archived, count_unread, delete, inbox, read, send, sent, unread};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(send))
        .route("/inbox", get(inbox))
        .route("/sent", get(sent))
        .route("/unread", get(unread))
        .route("/unread/count", get(count_unread))
        .route("/archived", get(archived))
        .route("/:id", get(read).delete(delete))
        .route("/:id/archive", patch(archive))
}
