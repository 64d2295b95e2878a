//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline outcomes produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → usage.rs (daily archive/error/cost ledger + alert thresholds)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//!     → GET /stats and GET /health
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every log line of a pipeline run
//! - Alerts are warnings, never rejections

pub mod logging;
pub mod metrics;
pub mod usage;

pub use usage::{UsageMetrics, UsageMonitor, UsageStatus};
