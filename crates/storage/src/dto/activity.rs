use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::ActivityStatus;

/// Request payload for creating a new activity
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateActivityRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "El título debe tener entre 1 y 255 caracteres"
    ))]
    pub title: String,

    #[validate(length(min = 1, message = "La descripción es obligatoria"))]
    pub description: String,

    pub starts_at: DateTime<Utc>,

    pub ends_at: Option<DateTime<Utc>>,

    #[validate(length(min = 1, max = 255, message = "El lugar es obligatorio"))]
    pub location: String,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    #[validate(range(min = 1, message = "Debe haber al menos 1 cupo"))]
    pub capacity: i32,

    #[validate(range(min = 0))]
    #[serde(default)]
    pub volunteer_hours: i32,

    #[serde(default)]
    pub requirements: Vec<String>,

    #[serde(default)]
    pub categories: Vec<String>,
}

/// Request payload for updating an existing activity
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[validate(length(min = 1))]
    pub description: String,

    pub starts_at: DateTime<Utc>,

    pub ends_at: Option<DateTime<Utc>>,

    #[validate(length(min = 1, max = 255))]
    pub location: String,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    #[validate(range(min = 1, message = "Debe haber al menos 1 cupo"))]
    pub capacity: i32,

    #[validate(range(min = 0))]
    #[serde(default)]
    pub volunteer_hours: i32,

    #[serde(default)]
    pub requirements: Vec<String>,

    #[serde(default)]
    pub categories: Vec<String>,

    pub status: Option<ActivityStatus>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    pub status: ActivityStatus,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ActivitySearchParams {
    pub title: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DateRangeParams {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

fn check_schedule(
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), &'static str> {
    if let Some(end) = ends_at
        && end < starts_at
    {
        return Err("La fecha de fin debe ser posterior a la fecha de inicio");
    }
    Ok(())
}

impl CreateActivityRequest {
    /// Additional validation that requires multiple fields
    pub fn validate_schedule(&self) -> Result<(), &'static str> {
        check_schedule(self.starts_at, self.ends_at)
    }
}

impl UpdateActivityRequest {
    pub fn validate_schedule(&self) -> Result<(), &'static str> {
        check_schedule(self.starts_at, self.ends_at)
    }
}

impl DateRangeParams {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.to < self.from {
            return Err("'to' debe ser posterior a 'from'");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn request(starts_at: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> CreateActivityRequest {
        CreateActivityRequest {
            title: "Limpieza de playa".to_string(),
            description: "Recogida de residuos".to_string(),
            starts_at,
            ends_at,
            location: "Playa Norte".to_string(),
            address: None,
            capacity: 10,
            volunteer_hours: 4,
            requirements: vec![],
            categories: vec![],
        }
    }

    #[test]
    fn end_before_start_is_rejected() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        let req = request(start, Some(start - Duration::hours(1)));
        assert!(req.validate_schedule().is_err());
    }

    #[test]
    fn open_ended_schedule_is_accepted() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        assert!(request(start, None).validate_schedule().is_ok());
        assert!(request(start, Some(start)).validate_schedule().is_ok());
    }

    #[test]
    fn zero_capacity_fails_field_validation() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        let mut req = request(start, None);
        req.capacity = 0;
        assert!(req.validate().is_err());
    }
}
