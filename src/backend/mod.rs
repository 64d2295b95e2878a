//! Archive backend subsystem.
//!
//! The gate never fetches, summarizes or stores anything itself. It hands the
//! validated URL with sanitized tags and note to an [`ArchiveBackend`] and
//! interprets the outcome.
//!
//! # Design Decisions
//! - One trait seam so the pipeline can be driven by an in-process fake
//! - Timeouts belong to the backend wrapper, not to the pipeline
//! - No retries: retry policy belongs to the caller

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::BackendError;

pub use client::HttpArchiveBackend;
pub use types::{ArchiveCall, ArchiveOutcome, BackendResponse};

/// External service that performs the actual archiving.
#[async_trait]
pub trait ArchiveBackend: Send + Sync {
    async fn archive(
        &self,
        url: &str,
        tags: &[String],
        note: &str,
    ) -> Result<ArchiveOutcome, BackendError>;
}
