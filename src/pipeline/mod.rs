//! Request-gating pipeline.
//!
//! # Data Flow
//! ```text
//! ArchiveRequest
//!     → security::validator (URL allow-list, tags, note)
//!     → security::rate_limit (admission check, no quota consumed)
//!     → backend (the only suspension point besides the admission lock)
//!     → rate_limit.record_request + usage.record_archive   (success)
//!     → usage.record_error                                 (backend failure)
//!     → ArchiveResult envelope
//! ```
//!
//! # Design Decisions
//! - Components are constructed and injected, never global
//! - Nothing escapes as an error; every outcome becomes an envelope

pub mod gate;
pub mod types;

pub use gate::{GatingPipeline, Stage};
pub use types::{ArchiveRequest, ArchiveResult};
