//! Domain operations shared by every transport.
//!
//! Services speak to persistence only through [`Store`](crate::Store), so the
//! same code runs against PostgreSQL and the in-memory store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Role, User};

pub mod audit_trail;
pub mod capacity;
pub mod certificate_issuance;
pub mod certificate_pdf;
pub mod enrollment_lifecycle;
pub mod mail;
pub mod notifications;
pub mod reminder_sweep;
pub mod statistics;

/// The authenticated caller on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Owners always pass; coordinators and administrators act on anyone.
    pub fn can_act_for(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_staff()
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}
