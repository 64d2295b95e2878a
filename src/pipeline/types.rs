//! Request and result envelope types.

use serde::{Deserialize, Serialize};

use crate::backend::ArchiveOutcome;
use crate::error::{ErrorKind, GateError};

/// An "archive this URL" request as received from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub note: String,
}

impl ArchiveRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// Uniform result of one pipeline run.
///
/// Success carries whatever identifiers the backend produced; failure carries
/// the error kind and, for rate limiting, how long to wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ArchiveResult {
    pub(crate) fn completed(message: String, outcome: ArchiveOutcome) -> Self {
        Self {
            success: true,
            message,
            title: outcome.title,
            markdown_path: outcome.markdown_path,
            notebook_url: outcome.notebook_url,
            source_id: outcome.source_id,
            error: None,
            retry_after: None,
        }
    }

    pub(crate) fn failed(err: &GateError) -> Self {
        let message = match err {
            GateError::Validation(msg) | GateError::DangerousContent(msg) => msg.clone(),
            GateError::Backend(e) => format!("Archive failed: {}", e.message()),
            other => other.to_string(),
        };
        Self {
            success: false,
            message,
            title: None,
            markdown_path: None,
            notebook_url: None,
            source_id: None,
            error: Some(err.kind()),
            retry_after: err.retry_after(),
        }
    }
}
