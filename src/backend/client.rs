//! HTTP archive backend client with timeout and error handling.
//!
//! # Responsibilities
//! - POST the sanitized request to the archiving API
//! - Bound every call with a hard deadline
//! - Map transport, status and body failures onto `BackendError`

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::backend::types::{ArchiveCall, ArchiveOutcome, BackendResponse};
use crate::backend::ArchiveBackend;
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::observability::metrics;

const FALLBACK_FAILURE: &str = "Archive failed";

/// Archive backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpArchiveBackend {
    client: reqwest::Client,
    endpoint: String,
    source: String,
    timeout_duration: Duration,
}

impl HttpArchiveBackend {
    /// Build a client for the configured backend.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        if !config.token.is_empty() {
            let value = HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|e| BackendError::Transport(format!("invalid backend token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let endpoint = format!("{}/archive", config.url.trim_end_matches('/'));
        tracing::info!(endpoint = %endpoint, timeout_secs = config.timeout_secs, "Archive backend configured");

        Ok(Self {
            client,
            endpoint,
            source: config.source.clone(),
            timeout_duration: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, call: &ArchiveCall) -> Result<ArchiveOutcome, BackendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(call)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let parsed = serde_json::from_str::<BackendResponse>(&body);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = parsed.map_err(|e| BackendError::Malformed(e.to_string()))?;
        if !parsed.success {
            return Err(BackendError::Rejected(
                parsed.error.unwrap_or_else(|| FALLBACK_FAILURE.to_string()),
            ));
        }

        if let Some(ms) = parsed.duration_ms {
            tracing::debug!(backend_duration_ms = ms, "Backend reported duration");
        }
        Ok(parsed.into())
    }
}

#[async_trait]
impl ArchiveBackend for HttpArchiveBackend {
    async fn archive(
        &self,
        url: &str,
        tags: &[String],
        note: &str,
    ) -> Result<ArchiveOutcome, BackendError> {
        let call = ArchiveCall {
            url: url.to_string(),
            tags: tags.to_vec(),
            note: note.to_string(),
            source: self.source.clone(),
        };

        tracing::info!(endpoint = %self.endpoint, "Calling archive backend");
        let start = Instant::now();
        let result = match timeout(self.timeout_duration, self.send(&call)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.timeout_duration.as_secs())),
        };
        metrics::record_backend_duration(start);
        result
    }
}
