use chrono::{DateTime, Utc};
use storage::{
    Store,
    dto::auth::{
        LoginRequest, RecoveryRequest, RegisterRequest, ResetPasswordRequest,
        VerifyRecoveryCodeRequest,
    },
    error::StorageError,
    models::{CODE_TTL_MINUTES, PasswordReset, Role, User},
    services::{
        Actor, audit_trail,
        mail::{Email, EmailQueue},
    },
};
use tracing::info;
use uuid::Uuid;

use crate::{config::AdminSeed, error::WebError, password, token::TokenSigner};

/// Creates an active, unverified volunteer account and signs a token for it.
pub async fn register(
    store: &dyn Store,
    tokens: &TokenSigner,
    request: &RegisterRequest,
    now: DateTime<Utc>,
) -> Result<(User, String), WebError> {
    let email = request.email.trim().to_lowercase();
    if store.email_exists(&email).await? {
        return Err(WebError::BadRequest("El correo ya está registrado".to_string()));
    }

    let user = User {
        user_id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        email,
        password_hash: password::hash(&request.password)?,
        phone: request.phone.clone(),
        address: request.address.clone(),
        role: Role::Volunteer,
        skills: request.skills.clone(),
        interests: request.interests.clone(),
        is_active: true,
        is_verified: false,
        notifications_enabled: true,
        created_at: now,
        updated_at: now,
        last_login_at: None,
    };
    let user = store.create_user(&user).await.map_err(|e| {
        if e.is_unique_violation() {
            WebError::BadRequest("El correo ya está registrado".to_string())
        } else {
            WebError::from(e)
        }
    })?;

    audit_trail::record(
        store,
        Some(&Actor::from(&user)),
        "REGISTER",
        "User",
        user.user_id,
        format!("Registro de {}", user.email),
    )
    .await;

    let token = tokens.issue(&user, now);
    Ok((user, token))
}

pub async fn login(
    store: &dyn Store,
    tokens: &TokenSigner,
    request: &LoginRequest,
    now: DateTime<Utc>,
) -> Result<(User, String), WebError> {
    let invalid = || WebError::Unauthorized("Credenciales inválidas".to_string());

    let mut user = store
        .find_user_by_email(&request.email.trim().to_lowercase())
        .await?
        .ok_or_else(invalid)?;
    if !password::verify(&request.password, &user.password_hash) {
        tracing::info!(user_id = %user.user_id, "Failed login attempt");
        return Err(invalid());
    }
    if !user.is_active {
        return Err(WebError::Storage(StorageError::bad_request(
            "La cuenta está desactivada",
        )));
    }

    user.last_login_at = Some(now);
    user.updated_at = now;
    let user = store.update_user(&user).await?;

    audit_trail::record(
        store,
        Some(&Actor::from(&user)),
        "LOGIN",
        "User",
        user.user_id,
        "Inicio de sesión",
    )
    .await;

    let token = tokens.issue(&user, now);
    Ok((user, token))
}

/// Creates the configured administrator unless the email is already taken.
/// Returns the account only when it was created.
pub async fn ensure_admin(
    store: &dyn Store,
    seed: &AdminSeed,
    now: DateTime<Utc>,
) -> Result<Option<User>, WebError> {
    let email = seed.email.trim().to_lowercase();
    if store.email_exists(&email).await? {
        info!(%email, "Administrator account already present");
        return Ok(None);
    }

    let admin = User {
        user_id: Uuid::new_v4(),
        name: seed.name.clone(),
        email,
        password_hash: password::hash(&seed.password)?,
        phone: None,
        address: None,
        role: Role::Administrator,
        skills: vec![],
        interests: vec![],
        is_active: true,
        is_verified: true,
        notifications_enabled: true,
        created_at: now,
        updated_at: now,
        last_login_at: None,
    };
    let admin = store.create_user(&admin).await?;

    audit_trail::record(
        store,
        None,
        "BOOTSTRAP_ADMIN",
        "User",
        admin.user_id,
        format!("Administrador inicial {}", admin.email),
    )
    .await;
    info!(user_id = %admin.user_id, email = %admin.email, "Administrator account created");

    Ok(Some(admin))
}

async fn user_by_email(store: &dyn Store, email: &str) -> Result<User, WebError> {
    let email = email.trim().to_lowercase();
    store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| {
            WebError::Storage(StorageError::NotFound(format!(
                "Usuario no encontrado con correo {email}"
            )))
        })
}

/// Stores a fresh six digit code for the account and mails it. A new request
/// replaces any recovery already in flight.
pub async fn request_recovery(
    store: &dyn Store,
    mail: &EmailQueue,
    request: &RecoveryRequest,
    now: DateTime<Utc>,
) -> Result<(), WebError> {
    let user = user_by_email(store, &request.email).await?;
    let code = password::recovery_code();
    store
        .save_password_reset(&PasswordReset::code(user.user_id, code.clone(), now))
        .await?;

    mail.enqueue(Email::new(
        &user.email,
        "Recuperación de contraseña",
        format!(
            "Hola {}, tu código de recuperación es {}. Vence en {} minutos.",
            user.name, code, CODE_TTL_MINUTES
        ),
    ));
    info!(user_id = %user.user_id, "Password recovery code issued");
    Ok(())
}

/// Trades a valid code for a short-lived reset token.
pub async fn verify_recovery_code(
    store: &dyn Store,
    request: &VerifyRecoveryCodeRequest,
    now: DateTime<Utc>,
) -> Result<String, WebError> {
    let user = user_by_email(store, &request.email).await?;
    let pending = store
        .find_password_reset(user.user_id)
        .await?
        .filter(|r| !r.verified && r.secret == request.code.trim())
        .ok_or_else(|| WebError::BadRequest("Código de verificación inválido".to_string()))?;
    if pending.is_expired(now) {
        return Err(WebError::BadRequest("El código ha expirado".to_string()));
    }

    let token = Uuid::new_v4().simple().to_string();
    store
        .save_password_reset(&PasswordReset::reset_token(user.user_id, token.clone(), now))
        .await?;
    Ok(token)
}

/// Sets the new password for the holder of a reset token; the token is
/// single use.
pub async fn reset_password(
    store: &dyn Store,
    request: &ResetPasswordRequest,
    now: DateTime<Utc>,
) -> Result<(), WebError> {
    let reset = store
        .find_password_reset_by_token(request.token.trim())
        .await?
        .ok_or_else(|| WebError::BadRequest("Token de recuperación inválido".to_string()))?;
    if reset.is_expired(now) {
        return Err(WebError::BadRequest(
            "El token de recuperación ha expirado".to_string(),
        ));
    }

    let mut user = store.find_user(reset.user_id).await?;
    user.password_hash = password::hash(&request.new_password)?;
    user.updated_at = now;
    let user = store.update_user(&user).await?;
    store.delete_password_reset(user.user_id).await?;

    audit_trail::record(
        store,
        Some(&Actor::from(&user)),
        "RECUPERACION_PASSWORD",
        "User",
        user.user_id,
        "Contraseña recuperada",
    )
    .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage::MemoryStore;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret-0123456789", Duration::hours(1)).unwrap()
    }

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ana Pérez".to_string(),
            email: email.to_string(),
            password: "secreto123".to_string(),
            phone: None,
            address: None,
            skills: vec![],
            interests: vec![],
        }
    }

    #[tokio::test]
    async fn register_creates_a_volunteer_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let tokens = signer();
        let now = Utc::now();

        let (user, token) = register(&store, &tokens, &registration("ana@ong.org"), now)
            .await
            .unwrap();
        assert_eq!(user.role, Role::Volunteer);
        assert!(user.is_active && !user.is_verified && user.notifications_enabled);
        assert_eq!(tokens.verify(&token, now).unwrap().sub, user.user_id);

        let err = register(&store, &tokens, &registration("ANA@ong.org"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, WebError::BadRequest(_)));
    }

    #[tokio::test]
    async fn login_checks_password_and_activation() {
        let store = MemoryStore::new();
        let tokens = signer();
        let now = Utc::now();
        let (mut user, _) = register(&store, &tokens, &registration("ana@ong.org"), now)
            .await
            .unwrap();

        let wrong = LoginRequest {
            email: "ana@ong.org".to_string(),
            password: "incorrecta".to_string(),
        };
        assert!(matches!(
            login(&store, &tokens, &wrong, now).await,
            Err(WebError::Unauthorized(_))
        ));

        let right = LoginRequest {
            email: "ana@ong.org".to_string(),
            password: "secreto123".to_string(),
        };
        let (logged_in, _) = login(&store, &tokens, &right, now).await.unwrap();
        assert_eq!(logged_in.last_login_at, Some(now));

        user.is_active = false;
        store.update_user(&user).await.unwrap();
        assert!(matches!(
            login(&store, &tokens, &right, now).await,
            Err(WebError::Storage(StorageError::BadRequest(_)))
        ));
    }

    fn seed() -> AdminSeed {
        AdminSeed {
            name: "Administrador".to_string(),
            email: "Admin@ONG.org".to_string(),
            password: "admin-secreto".to_string(),
        }
    }

    #[tokio::test]
    async fn admin_bootstrap_runs_once() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let admin = ensure_admin(&store, &seed(), now).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Administrator);
        assert_eq!(admin.email, "admin@ong.org");
        assert!(admin.is_active && admin.is_verified);

        assert!(ensure_admin(&store, &seed(), now).await.unwrap().is_none());
        let admins = store.list_users_by_role(Role::Administrator, false).await.unwrap();
        assert_eq!(admins.len(), 1);

        let credentials = LoginRequest {
            email: "admin@ong.org".to_string(),
            password: "admin-secreto".to_string(),
        };
        assert!(login(&store, &signer(), &credentials, now).await.is_ok());
    }

    #[tokio::test]
    async fn admin_bootstrap_leaves_an_existing_account_alone() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let (volunteer, _) = register(&store, &signer(), &registration("admin@ong.org"), now)
            .await
            .unwrap();

        assert!(ensure_admin(&store, &seed(), now).await.unwrap().is_none());
        let stored = store.find_user(volunteer.user_id).await.unwrap();
        assert_eq!(stored.role, Role::Volunteer);
    }

    async fn recovery_code_for(store: &MemoryStore, user: &User, now: DateTime<Utc>) -> String {
        let (mail, mut outbox) = EmailQueue::channel(4);
        let request = RecoveryRequest {
            email: user.email.clone(),
        };
        request_recovery(store, &mail, &request, now).await.unwrap();

        let email = outbox.try_recv().unwrap();
        assert_eq!(email.to, user.email);
        let code = store
            .find_password_reset(user.user_id)
            .await
            .unwrap()
            .unwrap()
            .secret;
        assert!(email.body.contains(&code));
        code
    }

    #[tokio::test]
    async fn recovery_replaces_the_password_and_burns_the_token() {
        let store = MemoryStore::new();
        let tokens = signer();
        let now = Utc::now();
        let (user, _) = register(&store, &tokens, &registration("ana@ong.org"), now)
            .await
            .unwrap();

        let code = recovery_code_for(&store, &user, now).await;
        let verify = VerifyRecoveryCodeRequest {
            email: "ana@ong.org".to_string(),
            code,
        };
        let token = verify_recovery_code(&store, &verify, now).await.unwrap();

        // The code is spent once traded for a token.
        assert!(verify_recovery_code(&store, &verify, now).await.is_err());

        let reset = ResetPasswordRequest {
            token,
            new_password: "recuperada1".to_string(),
        };
        reset_password(&store, &reset, now).await.unwrap();

        let old = LoginRequest {
            email: "ana@ong.org".to_string(),
            password: "secreto123".to_string(),
        };
        assert!(login(&store, &tokens, &old, now).await.is_err());
        let new = LoginRequest {
            email: "ana@ong.org".to_string(),
            password: "recuperada1".to_string(),
        };
        assert!(login(&store, &tokens, &new, now).await.is_ok());

        let err = reset_password(&store, &reset, now).await.unwrap_err();
        assert!(matches!(err, WebError::BadRequest(ref m) if m.contains("inválido")));

        let audit = store.audit_by_action("RECUPERACION_PASSWORD").await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].actor_id, Some(user.user_id));
    }

    #[tokio::test]
    async fn recovery_rejects_wrong_or_stale_secrets() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let (user, _) = register(&store, &signer(), &registration("ana@ong.org"), now)
            .await
            .unwrap();
        let code = recovery_code_for(&store, &user, now).await;

        let wrong_code = if code == "000000" { "000001" } else { "000000" };
        let wrong = VerifyRecoveryCodeRequest {
            email: user.email.clone(),
            code: wrong_code.to_string(),
        };
        let err = verify_recovery_code(&store, &wrong, now).await.unwrap_err();
        assert!(matches!(err, WebError::BadRequest(ref m) if m.contains("inválido")));

        let right = VerifyRecoveryCodeRequest {
            email: user.email.clone(),
            code,
        };
        let late = now + Duration::minutes(CODE_TTL_MINUTES + 1);
        let err = verify_recovery_code(&store, &right, late).await.unwrap_err();
        assert!(matches!(err, WebError::BadRequest(ref m) if m.contains("expirado")));

        let token = verify_recovery_code(&store, &right, now).await.unwrap();
        let reset = ResetPasswordRequest {
            token,
            new_password: "recuperada1".to_string(),
        };
        let err = reset_password(&store, &reset, now + Duration::minutes(31))
            .await
            .unwrap_err();
        assert!(matches!(err, WebError::BadRequest(ref m) if m.contains("expirado")));
    }

    #[tokio::test]
    async fn recovery_for_unknown_email_is_not_found() {
        let store = MemoryStore::new();
        let (mail, mut outbox) = EmailQueue::channel(4);
        let request = RecoveryRequest {
            email: "nadie@ong.org".to_string(),
        };

        let err = request_recovery(&store, &mail, &request, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
        assert!(outbox.try_recv().is_err());
    }
}
