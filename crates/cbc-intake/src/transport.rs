//! HTTP transport for form submissions

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;

use crate::payload::SubmissionPayload;

/// Transport-level failure, before any HTTP status is known.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("client error: {0}")]
    Client(String),
}

/// What came back from the endpoint.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
    }
}

/// Sends one payload to the screening service.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, payload: &SubmissionPayload) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport posting JSON to a fixed endpoint.
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, payload: &SubmissionPayload) -> Result<RawResponse, TransportError> {
        tracing::info!(endpoint = %self.endpoint, fields = payload.len(), "submitting form");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = resp.text().await.map_err(classify)?;

        tracing::debug!(status, content_type = ?content_type, bytes = body.len(), "response received");
        Ok(RawResponse { status, content_type, body })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_detection() {
        let resp = RawResponse {
            status: 200,
            content_type: Some("Text/HTML; charset=utf-8".into()),
            body: String::new(),
        };
        assert!(resp.is_html());
        assert!(resp.is_success());

        let json = RawResponse { status: 201, content_type: Some("application/json".into()), body: "{}".into() };
        assert!(!json.is_html());

        let missing = RawResponse { status: 302, content_type: None, body: String::new() };
        assert!(!missing.is_html());
        assert!(!missing.is_success());
    }
}
