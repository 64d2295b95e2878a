//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): pipeline outcomes by `outcome`
//! - `gate_rate_limited_total` (counter): rejections by limit `window`
//! - `gate_backend_duration_seconds` (histogram): backend call latency
//! - `gate_daily_archives`, `gate_daily_errors`, `gate_daily_cost_usd` (gauges)
//! - `gate_usage_healthy` (gauge): 1=no alert threshold exceeded, 0=otherwise
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests pay nothing when the exporter is disabled.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one finished pipeline run.
pub fn record_request(outcome: &'static str) {
    ::metrics::counter!("gate_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited(window: &'static str) {
    ::metrics::counter!("gate_rate_limited_total", "window" => window).increment(1);
}

pub fn record_backend_duration(start: Instant) {
    ::metrics::histogram!("gate_backend_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Publish the current day's usage ledger.
pub fn record_usage(archives: u64, errors: u64, cost_usd: f64, healthy: bool) {
    ::metrics::gauge!("gate_daily_archives").set(archives as f64);
    ::metrics::gauge!("gate_daily_errors").set(errors as f64);
    ::metrics::gauge!("gate_daily_cost_usd").set(cost_usd);
    ::metrics::gauge!("gate_usage_healthy").set(if healthy { 1.0 } else { 0.0 });
}
