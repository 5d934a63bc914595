//! Bearer authentication and the role gate.
//!
//! Every `/api` request is matched against [`RULES`] before it reaches a
//! handler. Routes not listed there require an authenticated caller.

use axum::{
    extract::{Request, State},
    http::{Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{models::Role, services::Actor};

use crate::{AppState, error::WebError};

const STAFF: &[Role] = &[Role::Coordinator, Role::Administrator];
const ADMIN: &[Role] = &[Role::Administrator];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Roles(&'static [Role]),
}

/// Authorization table. First match wins, so literal segments must come
/// before a parameter in the same position (`/users/me` before `/users/:id`).
pub static RULES: &[(Method, &str, Access)] = &[
    (Method::POST, "/auth/register", Access::Public),
    (Method::POST, "/auth/login", Access::Public),
    (Method::POST, "/auth/recover-password", Access::Public),
    (Method::POST, "/auth/verify-code", Access::Public),
    (Method::POST, "/auth/reset-password", Access::Public),
    // activities
    (Method::GET, "/activities", Access::Public),
    (Method::GET, "/activities/available", Access::Public),
    (Method::GET, "/activities/search", Access::Public),
    (Method::GET, "/activities/range", Access::Public),
    (Method::GET, "/activities/status/:status", Access::Public),
    (Method::GET, "/activities/mine", Access::Roles(STAFF)),
    (Method::GET, "/activities/:id", Access::Public),
    (Method::POST, "/activities", Access::Roles(STAFF)),
    (Method::PUT, "/activities/:id", Access::Roles(STAFF)),
    (Method::PATCH, "/activities/:id/status", Access::Roles(STAFF)),
    (Method::DELETE, "/activities/:id", Access::Roles(STAFF)),
    // enrollments
    (Method::PATCH, "/enrollments/:id/approve", Access::Roles(STAFF)),
    (Method::PATCH, "/enrollments/:id/reject", Access::Roles(STAFF)),
    (Method::PATCH, "/enrollments/:id/attendance", Access::Roles(STAFF)),
    (Method::POST, "/enrollments/:id/evaluate", Access::Roles(STAFF)),
    (Method::GET, "/enrollments/activity/:id", Access::Roles(STAFF)),
    // certificates
    (Method::GET, "/certificates/verify/:code", Access::Public),
    (Method::POST, "/certificates/generate-admin", Access::Roles(STAFF)),
    // notifications
    (Method::POST, "/notifications/announcements", Access::Roles(STAFF)),
    // history
    (Method::GET, "/history/users/:user_id", Access::Roles(STAFF)),
    (Method::GET, "/history/users/:user_id/stats", Access::Roles(STAFF)),
    // users
    (Method::GET, "/users", Access::Roles(ADMIN)),
    (Method::GET, "/users/me", Access::Authenticated),
    (Method::GET, "/users/role/:role", Access::Roles(STAFF)),
    (Method::GET, "/users/:id", Access::Roles(STAFF)),
    (Method::PUT, "/users/me", Access::Authenticated),
    (Method::PUT, "/users/:id/role", Access::Roles(ADMIN)),
    (Method::PUT, "/users/:id/active", Access::Roles(ADMIN)),
    (Method::DELETE, "/users/:id", Access::Roles(ADMIN)),
    // admin
    (Method::GET, "/admin/*", Access::Roles(STAFF)),
];

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// `:name` matches one segment, a trailing `*` matches the rest.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut actual = segments(path);
    for expected in segments(pattern) {
        if expected == "*" {
            return true;
        }
        match actual.next() {
            Some(seg) if expected.starts_with(':') || expected == seg => {}
            _ => return false,
        }
    }
    actual.next().is_none()
}

pub fn required_access(method: &Method, path: &str) -> Access {
    let path = path.strip_prefix("/api").unwrap_or(path);
    RULES
        .iter()
        .find(|(m, pattern, _)| m == method && pattern_matches(pattern, path))
        .map(|(_, _, access)| *access)
        .unwrap_or(Access::Authenticated)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn authenticate(state: &AppState, token: Option<&str>) -> Result<Actor, WebError> {
    let unauthorized = || WebError::Unauthorized("Autenticación requerida".to_string());

    let token = token.ok_or_else(unauthorized)?;
    let claims = state.tokens.verify(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        unauthorized()
    })?;

    // The stored account is authoritative for role and activation.
    let user = state
        .store
        .find_user(claims.sub)
        .await
        .map_err(|_| unauthorized())?;
    if !user.is_active {
        tracing::warn!(user_id = %user.user_id, "Deactivated account presented a token");
        return Err(WebError::Unauthorized("La cuenta está desactivada".to_string()));
    }

    Ok(Actor::from(&user))
}

pub async fn gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let access = required_access(request.method(), request.uri().path());
    if access == Access::Public {
        return next.run(request).await;
    }

    // The request body is not Sync, so no borrow of the request may cross the await.
    let token = bearer_token(&request).map(str::to_owned);
    let actor = match authenticate(&state, token.as_deref()).await {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    if let Access::Roles(roles) = access
        && !roles.contains(&actor.role)
    {
        tracing::warn!(
            user_id = %actor.user_id,
            role = %actor.role,
            path = %request.uri().path(),
            "Role not allowed for route"
        );
        return WebError::Forbidden("No tienes permiso para realizar esta acción".to_string())
            .into_response();
    }

    request.extensions_mut().insert(actor);
    next.run(request).await
}
