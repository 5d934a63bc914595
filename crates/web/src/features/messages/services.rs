use chrono::{DateTime, Utc};
use storage::{
    Store,
    dto::message::SendMessageRequest,
    error::{Result, StorageError},
    models::Message,
    services::{Actor, audit_trail},
};
use uuid::Uuid;

pub async fn send(
    store: &dyn Store,
    actor: &Actor,
    request: &SendMessageRequest,
    now: DateTime<Utc>,
) -> Result<Message> {
    let recipient = store.find_user(request.recipient_id).await?;

    let message = Message {
        message_id: Uuid::new_v4(),
        sender_id: actor.user_id,
        recipient_id: recipient.user_id,
        subject: request.subject.clone(),
        body: request.body.clone(),
        is_read: false,
        is_archived: false,
        is_deleted: false,
        sent_at: now,
        read_at: None,
    };
    let message = store.create_message(&message).await?;

    audit_trail::record(
        store,
        Some(actor),
        "SEND_MESSAGE",
        "Message",
        message.message_id,
        format!("Mensaje enviado a {}", recipient.email),
    )
    .await;

    Ok(message)
}

pub async fn inbox(store: &dyn Store, actor: &Actor) -> Result<Vec<Message>> {
    store.list_inbox(actor.user_id).await
}

pub async fn sent(store: &dyn Store, actor: &Actor) -> Result<Vec<Message>> {
    store.list_sent(actor.user_id).await
}

pub async fn unread(store: &dyn Store, actor: &Actor) -> Result<Vec<Message>> {
    store.list_unread_messages(actor.user_id).await
}

pub async fn count_unread(store: &dyn Store, actor: &Actor) -> Result<i64> {
    store.count_unread_messages(actor.user_id).await
}

pub async fn archived(store: &dyn Store, actor: &Actor) -> Result<Vec<Message>> {
    store.list_archived_messages(actor.user_id).await
}

/// Soft-deleted messages are invisible to both participants.
async fn find_visible(store: &dyn Store, message_id: Uuid) -> Result<Message> {
    let message = store.find_message(message_id).await?;
    if message.is_deleted {
        return Err(StorageError::not_found("Mensaje", message_id));
    }
    Ok(message)
}

/// Reading as the recipient marks the message read.
pub async fn read(
    store: &dyn Store,
    actor: &Actor,
    message_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Message> {
    let mut message = find_visible(store, message_id).await?;
    if !message.involves(actor.user_id) {
        return Err(StorageError::Forbidden(
            "No tienes permiso para ver este mensaje".to_string(),
        ));
    }

    if message.recipient_id == actor.user_id && !message.is_read {
        message.is_read = true;
        message.read_at = Some(now);
        message = store.update_message(&message).await?;
    }
    Ok(message)
}

pub async fn archive(store: &dyn Store, actor: &Actor, message_id: Uuid) -> Result<Message> {
    let mut message = find_visible(store, message_id).await?;
    if message.recipient_id != actor.user_id {
        return Err(StorageError::Forbidden(
            "Solo el destinatario puede archivar este mensaje".to_string(),
        ));
    }

    message.is_archived = true;
    store.update_message(&message).await
}

pub async fn delete(store: &dyn Store, actor: &Actor, message_id: Uuid) -> Result<()> {
    let mut message = find_visible(store, message_id).await?;
    if !message.involves(actor.user_id) {
        return Err(StorageError::Forbidden(
            "No tienes permiso para eliminar este mensaje".to_string(),
        ));
    }

    message.is_deleted = true;
    store.update_message(&message).await?;

    audit_trail::record(
        store,
        Some(actor),
        "DELETE_MESSAGE",
        "Message",
        message_id,
        "Mensaje eliminado",
    )
    .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{
        MemoryStore,
        models::{Role, User},
    };

    async fn member(store: &MemoryStore, email: &str) -> Actor {
        let now = Utc::now();
        let user = User {
            user_id: Uuid::new_v4(),
            name: email.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            phone: None,
            address: None,
            role: Role::Volunteer,
            skills: vec![],
            interests: vec![],
            is_active: true,
            is_verified: false,
            notifications_enabled: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        Actor::from(&store.create_user(&user).await.unwrap())
    }

    fn hello(to: &Actor) -> SendMessageRequest {
        SendMessageRequest {
            recipient_id: to.user_id,
            subject: "Hola".to_string(),
            body: "¿Vienes el sábado?".to_string(),
        }
    }

    #[tokio::test]
    async fn unknown_recipient_is_not_found() {
        let store = MemoryStore::new();
        let ana = member(&store, "ana@ong.org").await;
        let request = SendMessageRequest {
            recipient_id: Uuid::new_v4(),
            subject: "Hola".to_string(),
            body: "...".to_string(),
        };
        assert!(matches!(
            send(&store, &ana, &request, Utc::now()).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn recipient_read_marks_message_read() {
        let store = MemoryStore::new();
        let ana = member(&store, "ana@ong.org").await;
        let luis = member(&store, "luis@ong.org").await;
        let message = send(&store, &ana, &hello(&luis), Utc::now()).await.unwrap();
        assert_eq!(count_unread(&store, &luis).await.unwrap(), 1);

        // the sender reading does not flip the flag
        let seen = read(&store, &ana, message.message_id, Utc::now()).await.unwrap();
        assert!(!seen.is_read);

        let seen = read(&store, &luis, message.message_id, Utc::now()).await.unwrap();
        assert!(seen.is_read && seen.read_at.is_some());
        assert_eq!(count_unread(&store, &luis).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn outsiders_cannot_read_and_only_recipient_archives() {
        let store = MemoryStore::new();
        let ana = member(&store, "ana@ong.org").await;
        let luis = member(&store, "luis@ong.org").await;
        let eva = member(&store, "eva@ong.org").await;
        let message = send(&store, &ana, &hello(&luis), Utc::now()).await.unwrap();

        assert!(matches!(
            read(&store, &eva, message.message_id, Utc::now()).await,
            Err(StorageError::Forbidden(_))
        ));
        assert!(matches!(
            archive(&store, &ana, message.message_id).await,
            Err(StorageError::Forbidden(_))
        ));

        archive(&store, &luis, message.message_id).await.unwrap();
        assert_eq!(archived(&store, &luis).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleted_messages_disappear_from_listings() {
        let store = MemoryStore::new();
        let ana = member(&store, "ana@ong.org").await;
        let luis = member(&store, "luis@ong.org").await;
        let message = send(&store, &ana, &hello(&luis), Utc::now()).await.unwrap();

        delete(&store, &luis, message.message_id).await.unwrap();
        assert!(inbox(&store, &luis).await.unwrap().is_empty());
        assert!(sent(&store, &ana).await.unwrap().is_empty());
        assert!(matches!(
            read(&store, &ana, message.message_id, Utc::now()).await,
            Err(StorageError::NotFound(_))
        ));
    }
}
