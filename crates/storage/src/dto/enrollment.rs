use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::EnrollmentStatus;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttendanceRequest {
    pub attended: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EvaluationRequest {
    #[validate(range(min = 1, max = 5, message = "La calificación debe estar entre 1 y 5"))]
    pub rating: i16,

    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EnrollmentFilterParams {
    pub status: Option<EnrollmentStatus>,
}
