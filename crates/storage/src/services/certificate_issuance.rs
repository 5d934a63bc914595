//! Proof-of-service certificates derived from attended enrollments.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use super::mail::{Attachment, Email, EmailQueue};
use super::{Actor, audit_trail, certificate_pdf};
use crate::Store;
use crate::error::{Result, StorageError};
use crate::models::{Certificate, EnrollmentStatus};

pub const ALREADY_ISSUED_MESSAGE: &str = "Ya existe un certificado para esta actividad";

/// Eight uppercase hex characters taken from a random v4 UUID.
pub fn generate_verification_code() -> String {
    let mut code = Uuid::new_v4().simple().to_string();
    code.truncate(8);
    code.to_ascii_uppercase()
}

/// Issue the certificate for (user, activity).
///
/// Requires an approved enrollment with attendance recorded. The existence
/// check gives the friendly error; the unique constraint is what actually
/// guarantees a single certificate per pair.
pub async fn issue(
    store: &dyn Store,
    actor: &Actor,
    user_id: Uuid,
    activity_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Certificate> {
    let enrollment = store
        .find_enrollment_for(user_id, activity_id)
        .await?
        .ok_or_else(|| {
            StorageError::NotFound("No se encontró inscripción para esta actividad".to_string())
        })?;

    if !enrollment.attended {
        return Err(StorageError::bad_request(
            "No se puede generar certificado: el voluntario no asistió a la actividad",
        ));
    }
    if enrollment.status != EnrollmentStatus::Approved {
        return Err(StorageError::bad_request("La inscripción no está aprobada"));
    }
    if store.certificate_exists(user_id, activity_id).await? {
        return Err(StorageError::bad_request(ALREADY_ISSUED_MESSAGE));
    }

    let user = store.find_user(user_id).await?;
    let activity = store.find_activity(activity_id).await?;

    let certificate = Certificate {
        certificate_id: Uuid::new_v4(),
        user_id,
        activity_id,
        volunteer_name: user.name,
        activity_title: activity.title,
        description: activity.description,
        hours: activity.volunteer_hours,
        activity_date: activity.starts_at,
        verification_code: generate_verification_code(),
        issued_at: now,
    };

    let certificate = store.create_certificate(&certificate).await.map_err(|e| {
        if e.is_unique_violation() {
            StorageError::bad_request(ALREADY_ISSUED_MESSAGE)
        } else {
            e
        }
    })?;

    info!(
        certificate_id = %certificate.certificate_id,
        %user_id,
        %activity_id,
        "Certificate issued"
    );
    audit_trail::record(
        store,
        Some(actor),
        "ISSUE_CERTIFICATE",
        "Certificate",
        certificate.certificate_id,
        format!("Certificado generado para: {}", certificate.activity_title),
    )
    .await;

    Ok(certificate)
}

/// Public authenticity check
pub async fn verify(store: &dyn Store, code: &str) -> Result<Certificate> {
    store
        .find_certificate_by_code(&code.trim().to_ascii_uppercase())
        .await?
        .ok_or_else(|| {
            StorageError::NotFound(
                "Certificado no encontrado con el código proporcionado".to_string(),
            )
        })
}

pub async fn list_for_user(store: &dyn Store, user_id: Uuid) -> Result<Vec<Certificate>> {
    store.list_certificates_by_user(user_id).await
}

/// Owner or staff only
pub async fn get(store: &dyn Store, actor: &Actor, certificate_id: Uuid) -> Result<Certificate> {
    let certificate = store.find_certificate(certificate_id).await?;
    if !actor.can_act_for(certificate.user_id) {
        return Err(StorageError::Forbidden(
            "No tienes permiso para ver este certificado".to_string(),
        ));
    }
    Ok(certificate)
}

/// The rendered document, for the certificate owner only.
pub async fn download(store: &dyn Store, actor: &Actor, certificate_id: Uuid) -> Result<Vec<u8>> {
    let certificate = store.find_certificate(certificate_id).await?;
    if certificate.user_id != actor.user_id {
        return Err(StorageError::Forbidden(
            "No tienes permiso para descargar este certificado".to_string(),
        ));
    }
    certificate_pdf::render(&certificate)
}

/// Queue the rendered document to the volunteer's address.
pub async fn send_by_email(
    store: &dyn Store,
    mail: &EmailQueue,
    actor: &Actor,
    certificate_id: Uuid,
) -> Result<()> {
    let certificate = get(store, actor, certificate_id).await?;
    let user = store.find_user(certificate.user_id).await?;

    let body = format!(
        "Hola {},\n\nAdjuntamos tu certificado de participación en la actividad \"{}\".\n\
         Código de verificación: {}\n\nGracias por tu compromiso.",
        user.name, certificate.activity_title, certificate.verification_code
    );
    let email = Email::new(&user.email, "Tu certificado de participación", body).with_attachment(
        Attachment {
            filename: certificate_pdf::FILENAME.to_string(),
            content_type: certificate_pdf::CONTENT_TYPE.to_string(),
            bytes: certificate_pdf::render(&certificate)?,
        },
    );
    mail.enqueue(email);

    audit_trail::record(
        store,
        Some(actor),
        "EMAIL_CERTIFICATE",
        "Certificate",
        certificate_id,
        format!("Certificado enviado a {}", user.email),
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use crate::services::enrollment_lifecycle::tests::Fixture;

    #[test]
    fn verification_code_is_eight_uppercase_hex_chars() {
        let code = generate_verification_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[tokio::test]
    async fn issue_twice_is_rejected_and_verify_matches() {
        let fx = Fixture::new(MemoryStore::new(), 3).await;
        let volunteer = fx.volunteer("ana@ong.org").await;
        fx.attended(&volunteer).await;
        let actor = Actor::from(&volunteer);

        let cert = issue(&fx.store, &actor, volunteer.user_id, fx.activity_id, fx.now)
            .await
            .unwrap();
        let err = issue(&fx.store, &actor, volunteer.user_id, fx.activity_id, fx.now)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(ref m) if m == ALREADY_ISSUED_MESSAGE));

        let found = verify(&fx.store, &cert.verification_code.to_lowercase()).await.unwrap();
        assert_eq!(found.user_id, volunteer.user_id);
        assert_eq!(found.activity_id, fx.activity_id);
    }

    #[tokio::test]
    async fn issue_requires_attendance() {
        let fx = Fixture::new(MemoryStore::new(), 3).await;
        let volunteer = fx.volunteer("ben@ong.org").await;
        fx.approved(&volunteer).await;

        let err = issue(
            &fx.store,
            &Actor::from(&volunteer),
            volunteer.user_id,
            fx.activity_id,
            fx.now,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(_)));
    }

    #[tokio::test]
    async fn issue_without_enrollment_is_not_found() {
        let fx = Fixture::new(MemoryStore::new(), 3).await;
        let volunteer = fx.volunteer("cam@ong.org").await;

        let err = issue(
            &fx.store,
            &Actor::from(&volunteer),
            volunteer.user_id,
            fx.activity_id,
            fx.now,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            verify(&store, "ZZZZZZZZ").await.unwrap_err(),
            StorageError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn only_the_owner_downloads() {
        let fx = Fixture::new(MemoryStore::new(), 3).await;
        let volunteer = fx.volunteer("dan@ong.org").await;
        let other = fx.volunteer("eve@ong.org").await;
        fx.attended(&volunteer).await;
        let cert = issue(
            &fx.store,
            &Actor::from(&volunteer),
            volunteer.user_id,
            fx.activity_id,
            fx.now,
        )
        .await
        .unwrap();

        let pdf = download(&fx.store, &Actor::from(&volunteer), cert.certificate_id)
            .await
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let err = download(&fx.store, &Actor::from(&other), cert.certificate_id)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));
    }

    #[tokio::test]
    async fn email_carries_the_pdf() {
        let fx = Fixture::new(MemoryStore::new(), 3).await;
        let volunteer = fx.volunteer("fer@ong.org").await;
        fx.attended(&volunteer).await;
        let actor = Actor::from(&volunteer);
        let cert = issue(&fx.store, &actor, volunteer.user_id, fx.activity_id, fx.now)
            .await
            .unwrap();

        let (mail, mut rx) = EmailQueue::channel(4);
        send_by_email(&fx.store, &mail, &actor, cert.certificate_id)
            .await
            .unwrap();

        let email = rx.try_recv().unwrap();
        assert_eq!(email.to, "fer@ong.org");
        let attachment = email.attachment.unwrap();
        assert_eq!(attachment.filename, "certificado.pdf");
        assert_eq!(attachment.bytes, certificate_pdf::render(&cert).unwrap());
    }
}
