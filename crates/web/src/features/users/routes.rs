use axum::{
    Router,
    routing::{get, post, put},
};

use super::handlers::{
    change_password, change_role, delete_user, get_me, get_user, list_by_role, list_users,
    set_active, update_me,
};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_me).put(update_me))
        .route("/me/password", post(change_password))
        .route("/role/:role", get(list_by_role))
        .route("/:id", get(get_user).delete(delete_user))
        .route("/:id/role", put(change_role))
        .route("/:id/active", put(set_active))
}
