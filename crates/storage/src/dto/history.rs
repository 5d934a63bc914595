use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Participation summary for one volunteer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserStatistics {
    pub total_activities: i64,
    pub total_hours: i64,
    pub average_rating: f64,
    pub certificates_obtained: i64,
}

/// Platform-wide counters for the admin dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GlobalStatistics {
    pub total_volunteers: i64,
    pub active_volunteers: i64,
    pub total_activities: i64,
    pub active_activities: i64,
    pub finished_activities: i64,
    pub total_enrollments: i64,
    pub total_hours: i64,
}
