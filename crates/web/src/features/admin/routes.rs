use axum::{Router, routing::get};

use super::handlers::{
    all_enrollments, audit_between, audit_by_action, audit_by_user, global_stats, recent_audit,
};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(global_stats))
        .route("/audit", get(recent_audit))
        .route("/audit/user/:user_id", get(audit_by_user))
        .route("/audit/range", get(audit_between))
        .route("/audit/action/:action", get(audit_by_action))
        .route("/enrollments", get(all_enrollments))
}
