use chrono::Utc;
use storage::{
    Store,
    error::Result,
    models::Certificate,
    services::{Actor, certificate_issuance, mail::EmailQueue},
};
use uuid::Uuid;

/// Issues the caller's own certificate for an attended activity.
pub async fn generate_own(
    store: &dyn Store,
    actor: &Actor,
    activity_id: Uuid,
) -> Result<Certificate> {
    certificate_issuance::issue(store, actor, actor.user_id, activity_id, Utc::now()).await
}

pub async fn generate_for(
    store: &dyn Store,
    actor: &Actor,
    user_id: Uuid,
    activity_id: Uuid,
) -> Result<Certificate> {
    certificate_issuance::issue(store, actor, user_id, activity_id, Utc::now()).await
}

pub async fn list_mine(store: &dyn Store, actor: &Actor) -> Result<Vec<Certificate>> {
    certificate_issuance::list_for_user(store, actor.user_id).await
}

pub async fn get(store: &dyn Store, actor: &Actor, certificate_id: Uuid) -> Result<Certificate> {
    certificate_issuance::get(store, actor, certificate_id).await
}

pub async fn download(store: &dyn Store, actor: &Actor, certificate_id: Uuid) -> Result<Vec<u8>> {
    certificate_issuance::download(store, actor, certificate_id).await
}

pub async fn send_by_email(
    store: &dyn Store,
    mail: &EmailQueue,
    actor: &Actor,
    certificate_id: Uuid,
) -> Result<()> {
    certificate_issuance::send_by_email(store, mail, actor, certificate_id).await
}

pub async fn verify(store: &dyn Store, code: &str) -> Result<Certificate> {
    certificate_issuance::verify(store, code).await
}
