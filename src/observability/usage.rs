//! Daily usage ledger and alerting.
//!
//! Counts archives, backend errors and estimated spend for the current UTC
//! calendar day. Every operation first reconciles the day boundary, so the
//! counters are never read or written against a stale day. Thresholds only
//! inform operators; they never block a request.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clock::Clock;
use crate::config::AlertConfig;
use crate::observability::metrics;

/// Counters for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetrics {
    pub archive_count: u64,
    pub error_count: u64,
    #[serde(rename = "totalCostUSD")]
    pub total_cost_usd: f64,
    pub last_archive_timestamp: Option<DateTime<Utc>>,
}

/// Counters of a finished day, kept after rollover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub metrics: UsageMetrics,
}

/// Health view returned to operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStatus {
    pub metrics: UsageMetrics,
    pub alerts: Vec<String>,
    pub healthy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Threshold {
    Archives,
    Errors,
    Cost,
}

impl Threshold {
    fn label(&self) -> &'static str {
        match self {
            Threshold::Archives => "Archive limit exceeded",
            Threshold::Errors => "Error limit exceeded",
            Threshold::Cost => "Cost limit exceeded",
        }
    }

    fn detail(&self, m: &UsageMetrics, c: &AlertConfig) -> String {
        match self {
            Threshold::Archives => format!(
                "Daily archive limit exceeded: {}/{}",
                m.archive_count, c.max_daily_archives
            ),
            Threshold::Errors => format!(
                "Daily error limit exceeded: {}/{}",
                m.error_count, c.max_daily_errors
            ),
            Threshold::Cost => format!(
                "Daily cost limit exceeded: ${:.2}/${}",
                m.total_cost_usd, c.max_daily_cost_usd
            ),
        }
    }
}

fn exceeded(m: &UsageMetrics, c: &AlertConfig) -> Vec<Threshold> {
    let mut out = Vec::new();
    if m.archive_count > c.max_daily_archives {
        out.push(Threshold::Archives);
    }
    if m.error_count > c.max_daily_errors {
        out.push(Threshold::Errors);
    }
    if m.total_cost_usd > c.max_daily_cost_usd {
        out.push(Threshold::Cost);
    }
    out
}

#[derive(Debug)]
struct Ledger {
    metrics: UsageMetrics,
    day: NaiveDate,
    previous: Option<DaySummary>,
}

/// Process-wide usage monitor.
#[derive(Debug)]
pub struct UsageMonitor {
    ledger: Mutex<Ledger>,
    config: AlertConfig,
    clock: Arc<dyn Clock>,
}

impl UsageMonitor {
    pub fn new(config: AlertConfig, clock: Arc<dyn Clock>) -> Self {
        let day = clock.now().date_naive();
        tracing::info!(
            max_daily_archives = config.max_daily_archives,
            max_daily_errors = config.max_daily_errors,
            max_daily_cost_usd = config.max_daily_cost_usd,
            "Monitor initialized"
        );
        Self {
            ledger: Mutex::new(Ledger {
                metrics: UsageMetrics::default(),
                day,
                previous: None,
            }),
            config,
            clock,
        }
    }

    /// Lock the ledger, rolling it over first if the UTC day has changed.
    fn reconciled(&self) -> MutexGuard<'_, Ledger> {
        let today = self.clock.now().date_naive();
        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());

        if ledger.day != today {
            let outgoing = std::mem::take(&mut ledger.metrics);
            tracing::info!(
                previous_date = %ledger.day,
                current_date = %today,
                archive_count = outgoing.archive_count,
                error_count = outgoing.error_count,
                total_cost_usd = outgoing.total_cost_usd,
                "Daily metrics reset"
            );
            ledger.previous = Some(DaySummary {
                date: ledger.day,
                metrics: outgoing,
            });
            ledger.day = today;
            metrics::record_usage(0, 0, 0.0, true);
        }
        ledger
    }

    /// Reconcile the day boundary without touching the counters otherwise.
    pub fn check_daily_reset(&self) {
        drop(self.reconciled());
    }

    /// Book one successful archive and its estimated cost.
    pub fn record_archive(&self, cost_usd: f64) {
        let mut ledger = self.reconciled();
        ledger.metrics.archive_count += 1;
        ledger.metrics.total_cost_usd += cost_usd;
        ledger.metrics.last_archive_timestamp = Some(self.clock.now());

        tracing::info!(
            count = ledger.metrics.archive_count,
            cost = cost_usd,
            total_cost = ledger.metrics.total_cost_usd,
            "Archive recorded"
        );
        self.check_alerts(&ledger.metrics);
    }

    /// Book one backend failure.
    pub fn record_error(&self, error: &dyn std::fmt::Display) {
        let mut ledger = self.reconciled();
        ledger.metrics.error_count += 1;

        tracing::error!(
            error_count = ledger.metrics.error_count,
            error = %error,
            "Error recorded"
        );
        self.check_alerts(&ledger.metrics);
    }

    fn check_alerts(&self, m: &UsageMetrics) {
        let fired = exceeded(m, &self.config);
        metrics::record_usage(m.archive_count, m.error_count, m.total_cost_usd, fired.is_empty());

        if fired.is_empty() {
            return;
        }
        let alerts: Vec<String> = fired.iter().map(|t| t.detail(m, &self.config)).collect();
        tracing::warn!(
            alerts = ?alerts,
            archive_count = m.archive_count,
            error_count = m.error_count,
            total_cost_usd = m.total_cost_usd,
            "ALERTS TRIGGERED"
        );
    }

    /// Snapshot of today's counters.
    pub fn metrics(&self) -> UsageMetrics {
        self.reconciled().metrics.clone()
    }

    /// Counters of the most recent finished day, if a rollover happened.
    pub fn previous_day(&self) -> Option<DaySummary> {
        self.reconciled().previous.clone()
    }

    pub fn status(&self) -> UsageStatus {
        let ledger = self.reconciled();
        let alerts: Vec<String> = exceeded(&ledger.metrics, &self.config)
            .iter()
            .map(|t| t.label().to_string())
            .collect();

        UsageStatus {
            metrics: ledger.metrics.clone(),
            healthy: alerts.is_empty(),
            alerts,
        }
    }
}
