//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming archive request:
//!     → validator.rs (URL allow-list, tag filtering, note scan)
//!     → rate_limit.rs (interval / hourly / daily windows)
//!     → Pass to backend
//!
//! Fetched third-party content:
//!     → sanitizer.rs (size bound, injection scan)
//! ```
//!
//! # Design Decisions
//! - Defense in depth: multiple layers of protection
//! - Fail closed: reject on any URL or note check failure
//! - Tags are filtered, not rejected; notes and content fail loudly
//! - No trust in client input

pub mod patterns;
pub mod rate_limit;
pub mod sanitizer;
pub mod validator;

pub use rate_limit::{LimitWindow, RateLimitDecision, RateLimiter, RateLimiterStats};
pub use sanitizer::{detect_injection_attempt, ContentSanitizer};
pub use validator::Validator;
