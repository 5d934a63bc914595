use axum::{Router, routing::get};

use super::handlers::{get_record, list_for_user, list_mine, my_stats, stats_for_user};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_mine))
        .route("/stats", get(my_stats))
        .route("/users/:user_id", get(list_for_user))
        .route("/users/:user_id/stats", get(stats_for_user))
        .route("/:id", get(get_record))
}
