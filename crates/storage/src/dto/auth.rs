use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::user::UserResponse;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(
        min = 2,
        max = 100,
        message = "El nombre debe tener entre 2 y 100 caracteres"
    ))]
    pub name: String,

    #[validate(email(message = "El correo debe ser válido"))]
    pub email: String,

    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,

    #[validate(length(max = 50))]
    pub phone: Option<String>,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "El correo debe ser válido"))]
    pub email: String,

    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecoveryRequest {
    #[validate(email(message = "El correo debe ser válido"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VerifyRecoveryCodeRequest {
    #[validate(email(message = "El correo debe ser válido"))]
    pub email: String,

    #[validate(length(equal = 6, message = "El código debe tener 6 dígitos"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResetTokenResponse {
    pub token: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "El token es obligatorio"))]
    pub token: String,

    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub new_password: String,
}
