use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Role, User};

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub notifications_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            role: user.role,
            skills: user.skills,
            interests: user.interests,
            is_active: user.is_active,
            is_verified: user.is_verified,
            notifications_enabled: user.notifications_enabled,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 50))]
    pub phone: Option<String>,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    pub skills: Option<Vec<String>>,

    pub interests: Option<Vec<String>>,

    pub notifications_enabled: Option<bool>,
}

impl UpdateProfileRequest {
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(address) = &self.address {
            user.address = Some(address.clone());
        }
        if let Some(skills) = &self.skills {
            user.skills = skills.clone();
        }
        if let Some(interests) = &self.interests {
            user.interests = interests.clone();
        }
        if let Some(enabled) = self.notifications_enabled {
            user.notifications_enabled = enabled;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}
