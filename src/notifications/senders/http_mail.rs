use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Serialize;

use super::{MailSender, SenderError};
use crate::config::MailConfig;

pub const DEFAULT_MAIL_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends mail through a transactional email HTTP API (JSON body, bearer key).
pub struct HttpMailSender {
    client: Client,
    api_url: String,
    api_key: String,
    from_address: String,
}

#[derive(Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl HttpMailSender {
    pub fn new(config: &MailConfig) -> Result<Self, SenderError> {
        Self::with_timeout(config, DEFAULT_MAIL_TIMEOUT)
    }

    /// Requests to the mail API give up after `timeout`.
    pub fn with_timeout(config: &MailConfig, timeout: Duration) -> Result<Self, SenderError> {
        if !config.api_url.starts_with("http://") && !config.api_url.starts_with("https://") {
            return Err(SenderError::InvalidConfiguration(format!(
                "Mail API URL must be http(s): {}",
                config.api_url
            )));
        }
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl MailSender for HttpMailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), SenderError> {
        let payload = OutgoingEmail {
            from: &self.from_address,
            to: [to],
            subject,
            html: html_body,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(SenderError::SendFailed(format!(
                "Mail API returned non-success status: {status}. Body: {error_body}"
            )));
        }

        Ok(())
    }
}
