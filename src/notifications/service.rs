use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::senders::{MailSender, SenderError};
use super::templates::{self, TemplateError};
use crate::db::entities::server;
use crate::db::services::normalize_email;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),
    #[error("Sender error: {0}")]
    SenderError(#[from] SenderError),
    #[error("Server {0} has no contact address")]
    MissingRecipient(i32),
}

/// Renders and dispatches down alerts to server owners.
pub struct NotificationService {
    sender: Arc<dyn MailSender>,
}

impl NotificationService {
    pub fn new(sender: Arc<dyn MailSender>) -> Self {
        Self { sender }
    }

    /// Emails the owner of `server` that it is down.
    pub async fn send_down_alert(
        &self,
        server: &server::Model,
        error_message: Option<&str>,
    ) -> Result<(), NotificationError> {
        let recipient = normalize_email(&server.user_email);
        if recipient.is_empty() {
            return Err(NotificationError::MissingRecipient(server.id));
        }

        let subject = templates::down_alert_subject(server);
        let body = templates::render_down_alert(server, error_message)?;
        self.sender.send(&recipient, &subject, &body).await?;

        info!(server_id = server.id, url = %server.url, "Down alert sent.");
        Ok(())
    }
}
