//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Domains eligible for archiving out of the box.
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &[
    "reddit.com",
    "news.ycombinator.com",
    "youtube.com",
    "youtu.be",
    "github.com",
    "arxiv.org",
    "medium.com",
    "substack.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "dev.to",
    "stackoverflow.com",
    "techcrunch.com",
    "theverge.com",
    "arstechnica.com",
    "wired.com",
];

/// Root configuration for the archive gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// HTTP listener for the exposed surface.
    pub listener: ListenerConfig,

    /// Sliding-window rate limits.
    pub rate_limit: RateLimitConfig,

    /// Daily usage alert thresholds.
    pub alerts: AlertConfig,

    /// Allow-list and input size bounds.
    pub validation: ValidationConfig,

    /// Downstream archiving service.
    pub backend: BackendConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8088").
    pub bind_address: String,

    /// Timeout for a whole HTTP request, backend call included.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8088".to_string(),
            request_timeout_secs: 180,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum recorded requests in any trailing 24h window.
    pub daily_limit: u32,

    /// Maximum recorded requests in any trailing 1h window.
    pub hourly_limit: u32,

    /// Minimum seconds between two recorded requests.
    pub min_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            daily_limit: 30,
            hourly_limit: 10,
            min_interval_secs: 30,
        }
    }
}

/// Usage alert thresholds. A threshold fires once the counter exceeds it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    pub max_daily_archives: u64,
    pub max_daily_errors: u64,
    pub max_daily_cost_usd: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_daily_archives: 50,
            max_daily_errors: 10,
            max_daily_cost_usd: 5.0,
        }
    }
}

/// Input validation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Registered domains; a host matches its domain or any subdomain of it.
    pub allowed_domains: Vec<String>,

    /// Notes are truncated to this many characters before scanning.
    pub max_note_length: usize,

    /// Surviving tags beyond this count are discarded.
    pub max_tag_count: usize,

    /// Tags longer than this are discarded.
    pub max_tag_length: usize,

    /// Fetched content is truncated to this many characters before scanning.
    pub max_content_size: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_domains: DEFAULT_ALLOWED_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            max_note_length: 1000,
            max_tag_count: 10,
            max_tag_length: 50,
            max_content_size: 50_000,
        }
    }
}

/// Archiving backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the archiving API; requests go to `{url}/archive`.
    pub url: String,

    /// Bearer token sent with every call. When empty the `Authorization`
    /// header is omitted rather than sent as a bare `Bearer `.
    pub token: String,

    /// Hard deadline for one backend call.
    pub timeout_secs: u64,

    /// Value of the `source` field identifying this gate to the backend.
    pub source: String,

    /// Cost booked against the daily budget per successful archive.
    pub estimated_cost_usd: f64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3100".to_string(),
            token: String::new(),
            timeout_secs: 120,
            source: "archive-gate".to_string(),
            estimated_cost_usd: 0.05,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// JSON for machine parsing, pretty for local development.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
