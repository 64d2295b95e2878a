//! Shutdown coordination for the gate.
//!
//! A latched flag: once triggered it stays triggered, so a task that starts
//! waiting after the signal still sees it.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::pipeline::GatingPipeline;

/// Cloneable handle to the process-wide stop flag.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            tracing::info!("Shutdown triggered");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`Shutdown::trigger`] has been called, before or after this.
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.wait_for(|stopped| *stopped).await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Log the day's usage and quota as they stand when the gate stops.
///
/// Nothing is persisted, so this line is the only record of a partial day.
pub fn report_final_usage(pipeline: &GatingPipeline) {
    let quota = pipeline.rate_limiter_stats();
    let usage = pipeline.monitoring_status();
    tracing::info!(
        archive_count = usage.metrics.archive_count,
        error_count = usage.metrics.error_count,
        total_cost_usd = usage.metrics.total_cost_usd,
        daily_requests = quota.daily_requests,
        healthy = usage.healthy,
        alerts = ?usage.alerts,
        "Final usage before shutdown"
    );
}
