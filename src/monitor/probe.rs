//! Single-shot HTTP reachability probe.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, redirect};
use thiserror::Error;

use crate::version;

pub const MAX_REDIRECTS: usize = 5;
pub const MAX_ERROR_MESSAGE_CHARS: usize = 500;
pub const TIMEOUT_MESSAGE: &str = "Request timeout";

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Outcome of one probe. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub success: bool,
    pub response_time_ms: u64,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
}

impl ProbeResult {
    pub fn up(response_time_ms: u64, status_code: u16) -> Self {
        Self {
            success: true,
            response_time_ms,
            status_code: Some(status_code),
            error_message: None,
        }
    }

    pub fn down(
        response_time_ms: u64,
        status_code: Option<u16>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            response_time_ms,
            status_code,
            error_message: Some(truncate_chars(&error_message.into(), MAX_ERROR_MESSAGE_CHARS)),
        }
    }
}

#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult;
}

/// Probes with a shared reqwest client: bounded timeout, limited redirects.
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(version::user_agent())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        let start_time = Instant::now();
        let result = self.client.get(url).send().await;
        let elapsed_ms = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                let status = response.status();
                if status.is_server_error() {
                    ProbeResult::down(
                        elapsed_ms,
                        Some(status.as_u16()),
                        format!("Request failed with status code {}", status.as_u16()),
                    )
                } else {
                    // 4xx still means the server answered.
                    ProbeResult::up(elapsed_ms, status.as_u16())
                }
            }
            Err(e) if e.is_timeout() => {
                ProbeResult::down(elapsed_ms, None, TIMEOUT_MESSAGE)
            }
            Err(e) => ProbeResult::down(
                elapsed_ms,
                e.status().map(|s| s.as_u16()),
                describe_error(&e),
            ),
        }
    }
}

/// Joins an error with its source chain; reqwest's top-level message alone
/// rarely says what went wrong.
fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
