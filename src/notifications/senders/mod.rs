use async_trait::async_trait;
use thiserror::Error;

pub mod http_mail;

#[derive(Error, Debug)]
pub enum SenderError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),
    #[error("Invalid configuration for sender: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Delivers a rendered HTML email to a single recipient.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), SenderError>;
}
