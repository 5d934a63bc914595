use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "notification_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    NewActivity,
    EnrollmentConfirmation,
    EnrollmentCancellation,
    Reminder,
    CapacityAlert,
    Announcement,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
    pub activity_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        activity_id: Option<Uuid>,
    ) -> Self {
        Self {
            notification_id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            body: body.into(),
            kind,
            activity_id,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
