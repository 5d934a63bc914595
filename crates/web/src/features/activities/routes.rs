use axum::{
    Router,
    routing::{get, patch},
};

use super::handlers::{
    change_status, create_activity, delete_activity, get_activity, list_activities,
    list_available, list_by_status, list_in_range, list_mine, search_activities, update_activity,
};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_activities).post(create_activity))
        .route("/available", get(list_available))
        .route("/search", get(search_activities))
        .route("/range", get(list_in_range))
        .route("/mine", get(list_mine))
        .route("/status/:status", get(list_by_status))
        .route(
            "/:id",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
        .route("/:id/status", patch(change_status))
}
