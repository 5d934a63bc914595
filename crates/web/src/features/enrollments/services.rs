//! Thin wrappers binding the request clock to the enrollment lifecycle.

use chrono::Utc;
use storage::{
    Store,
    error::Result,
    models::{Enrollment, EnrollmentStatus},
    services::{Actor, enrollment_lifecycle, mail::EmailQueue},
};
use uuid::Uuid;

pub async fn enroll(
    store: &dyn Store,
    mail: &EmailQueue,
    actor: &Actor,
    activity_id: Uuid,
) -> Result<Enrollment> {
    enrollment_lifecycle::enroll(store, mail, actor, activity_id, Utc::now()).await
}

pub async fn cancel(
    store: &dyn Store,
    mail: &EmailQueue,
    actor: &Actor,
    activity_id: Uuid,
) -> Result<Enrollment> {
    enrollment_lifecycle::cancel(store, mail, actor, activity_id, Utc::now()).await
}

pub async fn approve(
    store: &dyn Store,
    mail: &EmailQueue,
    actor: &Actor,
    enrollment_id: Uuid,
) -> Result<Enrollment> {
    enrollment_lifecycle::approve(store, mail, actor, enrollment_id).await
}

pub async fn reject(store: &dyn Store, actor: &Actor, enrollment_id: Uuid) -> Result<Enrollment> {
    enrollment_lifecycle::reject(store, actor, enrollment_id).await
}

pub async fn mark_attendance(
    store: &dyn Store,
    actor: &Actor,
    enrollment_id: Uuid,
    attended: bool,
) -> Result<Enrollment> {
    enrollment_lifecycle::mark_attendance(store, actor, enrollment_id, attended, Utc::now()).await
}

pub async fn evaluate(
    store: &dyn Store,
    actor: &Actor,
    enrollment_id: Uuid,
    rating: i16,
    comment: Option<&str>,
) -> Result<Enrollment> {
    enrollment_lifecycle::evaluate(store, actor, enrollment_id, rating, comment).await
}

pub async fn list_mine(store: &dyn Store, actor: &Actor) -> Result<Vec<Enrollment>> {
    enrollment_lifecycle::list_for_user(store, actor.user_id).await
}

pub async fn list_for_activity(
    store: &dyn Store,
    activity_id: Uuid,
    status: Option<EnrollmentStatus>,
) -> Result<Vec<Enrollment>> {
    enrollment_lifecycle::list_for_activity(store, activity_id, status).await
}
