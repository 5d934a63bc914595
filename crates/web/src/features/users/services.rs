use chrono::{DateTime, Utc};
use storage::{
    Store,
    dto::user::{ChangePasswordRequest, UpdateProfileRequest},
    error::{Result, StorageError},
    models::{Role, User},
    services::{Actor, audit_trail},
};
use uuid::Uuid;

use crate::{error::WebError, password};

pub async fn get_user(store: &dyn Store, user_id: Uuid) -> Result<User> {
    store.find_user(user_id).await
}

pub async fn list_users(store: &dyn Store) -> Result<Vec<User>> {
    store.list_users().await
}

pub async fn list_by_role(store: &dyn Store, role: Role) -> Result<Vec<User>> {
    store.list_users_by_role(role, false).await
}

pub async fn update_profile(
    store: &dyn Store,
    actor: &Actor,
    request: &UpdateProfileRequest,
    now: DateTime<Utc>,
) -> Result<User> {
    let mut user = store.find_user(actor.user_id).await?;
    request.apply(&mut user);
    user.updated_at = now;
    let user = store.update_user(&user).await?;

    audit_trail::record(
        store,
        Some(actor),
        "UPDATE_PROFILE",
        "User",
        user.user_id,
        "Perfil actualizado",
    )
    .await;
    Ok(user)
}

pub async fn change_password(
    store: &dyn Store,
    actor: &Actor,
    request: &ChangePasswordRequest,
    now: DateTime<Utc>,
) -> std::result::Result<(), WebError> {
    let mut user = store.find_user(actor.user_id).await?;
    if !password::verify(&request.current_password, &user.password_hash) {
        return Err(WebError::BadRequest(
            "La contraseña actual es incorrecta".to_string(),
        ));
    }

    user.password_hash = password::hash(&request.new_password)?;
    user.updated_at = now;
    store.update_user(&user).await?;

    audit_trail::record(
        store,
        Some(actor),
        "CHANGE_PASSWORD",
        "User",
        user.user_id,
        "Contraseña cambiada",
    )
    .await;
    Ok(())
}

pub async fn change_role(
    store: &dyn Store,
    actor: &Actor,
    user_id: Uuid,
    role: Role,
    now: DateTime<Utc>,
) -> Result<User> {
    let mut user = store.find_user(user_id).await?;
    let previous = user.role;
    user.role = role;
    user.updated_at = now;
    let user = store.update_user(&user).await?;

    audit_trail::record(
        store,
        Some(actor),
        "CHANGE_ROLE",
        "User",
        user.user_id,
        format!("Rol cambiado de {} a {}", previous, role),
    )
    .await;
    Ok(user)
}

pub async fn set_active(
    store: &dyn Store,
    actor: &Actor,
    user_id: Uuid,
    active: bool,
    now: DateTime<Utc>,
) -> Result<User> {
    if user_id == actor.user_id && !active {
        return Err(StorageError::bad_request(
            "No puedes desactivar tu propia cuenta",
        ));
    }

    let mut user = store.find_user(user_id).await?;
    user.is_active = active;
    user.updated_at = now;
    let user = store.update_user(&user).await?;

    let (action, detail) = if active {
        ("ACTIVATE_USER", "Usuario activado")
    } else {
        ("DEACTIVATE_USER", "Usuario desactivado")
    };
    audit_trail::record(store, Some(actor), action, "User", user.user_id, detail).await;
    Ok(user)
}

pub async fn delete_user(store: &dyn Store, actor: &Actor, user_id: Uuid) -> Result<()> {
    let user = store.find_user(user_id).await?;
    store.delete_user(user_id).await?;

    audit_trail::record(
        store,
        Some(actor),
        "DELETE_USER",
        "User",
        user_id,
        format!("Usuario eliminado: {}", user.email),
    )
    .await;
    Ok(())
}
