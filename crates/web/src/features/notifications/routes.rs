use axum::{
    Router,
    routing::{get, patch, post},
};

use super::handlers::{announce, count_unread, list, list_unread, mark_all_read, mark_read};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/unread", get(list_unread))
        .route("/unread/count", get(count_unread))
        .route("/read-all", patch(mark_all_read))
        .route("/announcements", post(announce))
        .route("/:id/read", patch(mark_read))
}
