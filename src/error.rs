//! Error taxonomy for the gate.
//!
//! Every failure a request can hit maps onto one [`ErrorKind`], which is what
//! callers see in the result envelope. Tag filtering never produces an error;
//! it drops offending tags instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire-level discriminant carried by failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Bad URL, scheme or domain.
    ValidationError,
    /// Note or content failed the injection scan.
    DangerousContent,
    /// One of the rate-limit windows is exhausted.
    RateLimitExceeded,
    /// The downstream archiving service failed.
    BackendError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::DangerousContent => "DANGEROUS_CONTENT",
            ErrorKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorKind::BackendError => "BACKEND_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure talking to the archiving backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend timed out after {0}s")]
    Timeout(u64),

    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed backend response: {0}")]
    Malformed(String),

    #[error("{0}")]
    Rejected(String),
}

impl BackendError {
    /// Message to surface to callers.
    ///
    /// Rejections and status errors carry the backend's own text verbatim.
    pub fn message(&self) -> String {
        match self {
            BackendError::Rejected(msg) => msg.clone(),
            BackendError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Any reason a gated request did not complete.
#[derive(Debug, Clone, Error)]
pub enum GateError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DangerousContent(String),

    #[error("content contains suspicious pattern: {pattern}")]
    SuspiciousPattern { pattern: &'static str },

    #[error("Rate limit exceeded: {reason}")]
    RateLimitExceeded { reason: String, retry_after: u64 },

    #[error("Archive failed: {0}")]
    Backend(#[from] BackendError),
}

impl GateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GateError::Validation(_) => ErrorKind::ValidationError,
            GateError::DangerousContent(_) | GateError::SuspiciousPattern { .. } => {
                ErrorKind::DangerousContent
            }
            GateError::RateLimitExceeded { .. } => ErrorKind::RateLimitExceeded,
            GateError::Backend(_) => ErrorKind::BackendError,
        }
    }

    /// Seconds the caller should wait before retrying, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            GateError::RateLimitExceeded { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::RateLimitExceeded).unwrap();
        assert_eq!(json, "\"RATE_LIMIT_EXCEEDED\"");
        assert_eq!(ErrorKind::ValidationError.to_string(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_suspicious_pattern_is_dangerous_content() {
        let err = GateError::SuspiciousPattern { pattern: "you_are_now" };
        assert_eq!(err.kind(), ErrorKind::DangerousContent);
        assert!(err.retry_after().is_none());
    }

    #[test]
    fn test_backend_message_prefers_backend_text() {
        let err = BackendError::Rejected("Notebook quota reached".into());
        assert_eq!(err.message(), "Notebook quota reached");

        let err = BackendError::Timeout(30);
        assert_eq!(err.message(), "backend timed out after 30s");
    }
}
