use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use super::handlers::{
    approve, cancel, enroll, evaluate, list_for_activity, list_mine, mark_attendance, reject,
};
use crate::AppState;

/// Routes nested under `/enrollments`. Path parameters in the same position
/// share one name so the router accepts them side by side.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mine", get(list_mine))
        .route("/activity/:id", get(list_for_activity))
        .route("/:id", delete(cancel))
        .route("/:id/approve", patch(approve))
        .route("/:id/reject", patch(reject))
        .route("/:id/attendance", patch(mark_attendance))
        .route("/:id/evaluate", post(evaluate))
}

/// Enrollment entry point merged into the `/activities` router.
pub fn activity_routes() -> Router<AppState> {
    Router::new().route("/:id/enroll", post(enroll))
}
