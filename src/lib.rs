//! Request-gating pipeline for an external archiving API.
//!
//! Each "archive this URL" request passes a domain allow-list, tag and note
//! sanitization, and a sliding-window rate limiter before it reaches the
//! backend. Outcomes feed a daily usage ledger with alert thresholds.

pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod security;

pub use config::schema::GateConfig;
pub use error::{ErrorKind, GateError};
pub use http::GateServer;
pub use lifecycle::Shutdown;
pub use pipeline::{ArchiveRequest, ArchiveResult, GatingPipeline};
