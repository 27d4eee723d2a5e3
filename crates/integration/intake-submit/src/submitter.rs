//! Payload submission.

use crate::{Result, SubmitError};
use async_trait::async_trait;
use intake_config::IntakeConfig;
use intake_core::SubmissionPayload;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Longest response body kept in an error
const MAX_ERROR_BODY: usize = 512;

/// Acknowledgement of an accepted submission
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub attempt_id: Uuid,
    pub status: u16,
    /// Parsed response body, `None` when the server sent nothing
    pub body: Option<serde_json::Value>,
}

/// Something that can deliver a finished payload
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submitter identifier, for logs
    fn name(&self) -> &str;

    /// Deliver `payload` exactly once.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<Receipt>;
}

/// POSTs the payload as JSON to a webhook endpoint
pub struct HttpSubmitter {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl HttpSubmitter {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn from_config(config: &IntakeConfig) -> Result<Self> {
        Self::new(config.endpoint.clone(), config.request_timeout)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, payload: &SubmissionPayload) -> Result<Receipt> {
        let attempt_id = Uuid::new_v4();
        tracing::debug!(%attempt_id, endpoint = %self.endpoint, "posting payload");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%attempt_id, %status, "submission rejected");
            return Err(SubmitError::Status {
                status: status.as_u16(),
                body: truncate(text, MAX_ERROR_BODY),
            });
        }

        let body = parse_body(&text)?;
        tracing::info!(%attempt_id, %status, "submission accepted");
        Ok(Receipt {
            attempt_id,
            status: status.as_u16(),
            body,
        })
    }
}

/// An empty body is fine; anything else must be JSON.
fn parse_body(text: &str) -> Result<Option<serde_json::Value>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|e| SubmitError::MalformedResponse(e.to_string()))
}

fn truncate(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    text
}

/// Logs the payload instead of sending it. Always succeeds.
pub struct DryRunSubmitter;

#[async_trait]
impl Submitter for DryRunSubmitter {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn submit(&self, payload: &SubmissionPayload) -> Result<Receipt> {
        let attempt_id = Uuid::new_v4();
        let json = serde_json::to_string_pretty(payload)
            .map_err(|e| SubmitError::MalformedResponse(e.to_string()))?;
        tracing::info!(%attempt_id, payload = %json, "[dry-run] would submit");
        Ok(Receipt {
            attempt_id,
            status: 200,
            body: None,
        })
    }
}
