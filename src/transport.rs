//! Client side of the command endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::debug;

use crate::content::ContentMeta;
use crate::protocol::{ActionResult, CommandForm, CommandResponse};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(String),
    #[error("server returned {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Post one command line with the caller's current path
    async fn run_command(&self, line: &str, referer: &str) -> Result<CommandResponse, TransportError>;

    /// Fetch metadata for the search palette
    async fn load_index(&self) -> Result<Vec<ContentMeta>, TransportError>;
}

/// reqwest-backed transport against a running server
pub struct HttpTransport {
    client: reqwest::Client,
    base: String,
}

impl HttpTransport {
    /// `timeout` of `None` waits indefinitely
    pub fn new(base: impl Into<String>, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base: base.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn run_command(&self, line: &str, referer: &str) -> Result<CommandResponse, TransportError> {
        let form = CommandForm {
            cmd: line.to_string(),
            referer: referer.to_string(),
        };

        let resp = self
            .client
            .post(format!("{}/api/commands", self.base))
            .form(&form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status().as_u16()));
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let body = resp.text().await?;
            let action: ActionResult =
                serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))?;
            debug!(action = action.action.as_str(), "action response");
            Ok(CommandResponse::Action(action))
        } else {
            Ok(CommandResponse::Html(resp.text().await?))
        }
    }

    async fn load_index(&self) -> Result<Vec<ContentMeta>, TransportError> {
        let resp = self
            .client
            .get(format!("{}/api/content", self.base))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
