//! Response mapping.
//!
//! # Responsibilities
//! - Map envelope error kinds to HTTP status codes
//! - Add `Retry-After` to rate-limit rejections
//!
//! # Design Decisions
//! - The body is always the JSON envelope, whatever the status

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorKind;
use crate::pipeline::ArchiveResult;

/// HTTP status for an envelope error kind (`None` = success).
pub fn status_for(kind: Option<ErrorKind>) -> StatusCode {
    match kind {
        None => StatusCode::OK,
        Some(ErrorKind::ValidationError) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::DangerousContent) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(ErrorKind::RateLimitExceeded) => StatusCode::TOO_MANY_REQUESTS,
        Some(ErrorKind::BackendError) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ArchiveResult {
    fn into_response(self) -> Response {
        let status = status_for(self.error);
        let retry_after = self.retry_after;
        let mut response = (status, Json(self)).into_response();

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
