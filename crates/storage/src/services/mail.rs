//! Outbound email.
//!
//! Callers hand messages to an [`EmailQueue`] and move on; a worker drains
//! the queue into a [`Mailer`]. Delivery outcomes never reach the caller.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

const SUBJECT_PREFIX: &str = "[Voluntariado ONG] ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<Attachment>,
}

impl Email {
    pub fn new(to: impl Into<String>, subject: &str, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: format!("{SUBJECT_PREFIX}{subject}"),
            body: body.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Transport seam for outbound email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Writes every email to the log instead of delivering it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            attachment = email.attachment.as_ref().map(|a| a.filename.as_str()),
            "Email dispatched"
        );
        Ok(())
    }
}

/// Producer side of the bounded email channel.
#[derive(Debug, Clone)]
pub struct EmailQueue {
    tx: mpsc::Sender<Email>,
}

impl EmailQueue {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Email>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Never blocks. A full or closed queue drops the email.
    pub fn enqueue(&self, email: Email) {
        match self.tx.try_send(email) {
            Ok(()) => {}
            Err(TrySendError::Full(email)) => {
                warn!(to = %email.to, subject = %email.subject, "Email queue full, dropping email");
            }
            Err(TrySendError::Closed(email)) => {
                warn!(
                    to = %email.to,
                    subject = %email.subject,
                    "Email worker gone, dropping email"
                );
            }
        }
    }
}

/// Drains the queue until every producer is dropped.
pub async fn run_worker(mut rx: mpsc::Receiver<Email>, mailer: Arc<dyn Mailer>) {
    while let Some(email) = rx.recv().await {
        if let Err(e) = mailer.send(&email).await {
            warn!(to = %email.to, error = %e, "Email delivery failed");
        }
    }
    info!("Email worker stopped");
}
