//! The gating pipeline.
//!
//! One run per request:
//!
//! ```text
//! Received → Validating → RateChecking → CallingBackend → Recording → Completed
//!                │              │               │
//!                ├─ RejectedByValidation        │
//!                │              └─ RejectedByRateLimit
//!                └──────────────────────────────┴─ Failed
//! ```
//!
//! Quota is consumed and usage booked only after the backend succeeds. A
//! backend failure is booked as an error and consumes no quota.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::Instrument;
use uuid::Uuid;

use crate::backend::{ArchiveBackend, ArchiveOutcome};
use crate::clock::Clock;
use crate::config::GateConfig;
use crate::error::{GateError, GateResult};
use crate::observability::metrics;
use crate::observability::usage::{UsageMonitor, UsageStatus};
use crate::pipeline::types::{ArchiveRequest, ArchiveResult};
use crate::security::rate_limit::{RateLimiter, RateLimiterStats};
use crate::security::sanitizer::ContentSanitizer;
use crate::security::validator::Validator;

/// Position of a run in the pipeline state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validating,
    RateChecking,
    CallingBackend,
    Recording,
    Completed,
    RejectedByValidation,
    RejectedByRateLimit,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Stage::Completed | Stage::RejectedByValidation | Stage::RejectedByRateLimit | Stage::Failed
        )
    }

    fn outcome_label(&self) -> &'static str {
        match self {
            Stage::Completed => "completed",
            Stage::RejectedByValidation => "rejected_validation",
            Stage::RejectedByRateLimit => "rejected_rate_limit",
            _ => "failed",
        }
    }
}

/// Tracks the stage of a single run.
struct Run {
    stage: Stage,
}

impl Run {
    fn new() -> Self {
        Self { stage: Stage::Received }
    }

    fn enter(&mut self, next: Stage) {
        tracing::debug!(from = ?self.stage, to = ?next, "Pipeline stage");
        self.stage = next;
    }

    /// Terminal stage for a failure seen while in the current stage.
    fn reject(&mut self, err: &GateError) {
        let next = match (self.stage, err) {
            (Stage::Validating, GateError::Validation(_)) => Stage::RejectedByValidation,
            (Stage::RateChecking, GateError::RateLimitExceeded { .. }) => Stage::RejectedByRateLimit,
            _ => Stage::Failed,
        };
        self.enter(next);
    }
}

/// Orchestrates validation, rate limiting, the backend call and bookkeeping.
pub struct GatingPipeline {
    validator: Validator,
    content: ContentSanitizer,
    rate_limiter: Arc<RateLimiter>,
    monitor: Arc<UsageMonitor>,
    backend: Arc<dyn ArchiveBackend>,
    estimated_cost_usd: f64,
    /// Serializes check → backend call → record so concurrent runs cannot
    /// both pass the limiter before either consumes quota.
    admission: Mutex<()>,
    /// Longest a run queues for admission before it is turned away.
    admission_wait: Duration,
}

impl GatingPipeline {
    pub fn new(
        validator: Validator,
        content: ContentSanitizer,
        rate_limiter: Arc<RateLimiter>,
        monitor: Arc<UsageMonitor>,
        backend: Arc<dyn ArchiveBackend>,
        estimated_cost_usd: f64,
    ) -> Self {
        Self {
            validator,
            content,
            rate_limiter,
            monitor,
            backend,
            estimated_cost_usd,
            admission: Mutex::new(()),
            admission_wait: Duration::from_secs(60),
        }
    }

    /// Bound the time a run may queue behind another run's backend call.
    pub fn with_admission_wait(mut self, wait: Duration) -> Self {
        self.admission_wait = wait;
        self
    }

    /// Build every guard from configuration around the given backend and clock.
    pub fn from_config(
        config: &GateConfig,
        backend: Arc<dyn ArchiveBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            Validator::new(&config.validation),
            ContentSanitizer::new(config.validation.max_content_size),
            Arc::new(RateLimiter::new(config.rate_limit, clock.clone())),
            Arc::new(UsageMonitor::new(config.alerts, clock)),
            backend,
            config.backend.estimated_cost_usd,
        )
        .with_admission_wait(admission_budget(config))
    }

    /// Run one request through every guard. Never fails: every outcome is an envelope.
    pub async fn archive(&self, request: ArchiveRequest) -> ArchiveResult {
        self.archive_with_id(request, Uuid::new_v4().to_string()).await
    }

    /// Same as [`GatingPipeline::archive`], logging under a caller-chosen request id.
    pub async fn archive_with_id(&self, request: ArchiveRequest, request_id: String) -> ArchiveResult {
        let span = tracing::info_span!("archive", request_id = %request_id, url = %request.url);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: ArchiveRequest) -> ArchiveResult {
        tracing::info!(tags = ?request.tags, "Archive URL request");
        let mut run = Run::new();

        let result = match self.gate(&mut run, &request).await {
            Ok(mut outcome) => {
                // Titles come from the fetched page, not from the caller.
                if let Some(title) = outcome.title.take() {
                    match self.content.sanitize_content(&title) {
                        Ok(clean) => outcome.title = Some(clean.to_string()),
                        Err(e) => tracing::warn!(error = %e, "Backend title rejected, dropping it"),
                    }
                }
                let message = format!(
                    "Successfully archived: {}",
                    outcome.title.as_deref().unwrap_or(&request.url)
                );
                tracing::info!(
                    markdown_path = ?outcome.markdown_path,
                    notebook_url = ?outcome.notebook_url,
                    "Archive completed"
                );
                ArchiveResult::completed(message, outcome)
            }
            Err(err) => {
                run.reject(&err);
                tracing::warn!(error = %err, kind = %err.kind(), stage = ?run.stage, "Archive rejected");
                ArchiveResult::failed(&err)
            }
        };

        metrics::record_request(run.stage.outcome_label());
        result
    }

    async fn gate(&self, run: &mut Run, request: &ArchiveRequest) -> GateResult<ArchiveOutcome> {
        run.enter(Stage::Validating);
        if !self.validator.validate_url(&request.url) {
            return Err(GateError::Validation(
                "URL not allowed (domain not in whitelist)".to_string(),
            ));
        }
        let tags = self.validator.sanitize_tags(&request.tags);
        let note = if request.note.is_empty() {
            String::new()
        } else {
            self.validator.sanitize_note(&request.note)?
        };

        run.enter(Stage::RateChecking);
        let _admission = match timeout(self.admission_wait, self.admission.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!(
                    waited_ms = self.admission_wait.as_millis() as u64,
                    "Admission wait expired behind an in-flight archive"
                );
                metrics::record_rate_limited("admission");
                return Err(GateError::RateLimitExceeded {
                    reason: "Another archive is in progress".to_string(),
                    retry_after: self.admission_wait.as_secs().max(1),
                });
            }
        };
        self.rate_limiter.can_make_request().into_result()?;

        run.enter(Stage::CallingBackend);
        match self.backend.archive(&request.url, &tags, &note).await {
            Ok(outcome) => {
                run.enter(Stage::Recording);
                self.rate_limiter.record_request();
                self.monitor.record_archive(self.estimated_cost_usd);
                run.enter(Stage::Completed);
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "Archive backend failed");
                self.monitor.record_error(&e);
                Err(GateError::Backend(e))
            }
        }
    }

    pub fn rate_limiter_stats(&self) -> RateLimiterStats {
        self.rate_limiter.stats()
    }

    pub fn monitoring_status(&self) -> UsageStatus {
        self.monitor.status()
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub fn monitor(&self) -> &Arc<UsageMonitor> {
        &self.monitor
    }
}

/// Whatever the HTTP deadline leaves after one full backend call, less a second
/// for validation and bookkeeping.
fn admission_budget(config: &GateConfig) -> Duration {
    let secs = config
        .listener
        .request_timeout_secs
        .saturating_sub(config.backend.timeout_secs)
        .saturating_sub(1);
    Duration::from_secs(secs)
}
