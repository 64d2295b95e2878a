//! Sliding-window rate limiting for archive requests.
//!
//! Every successful archive leaves one timestamp behind. Admission checks the
//! minimum spacing since the last timestamp, then the trailing hour, then the
//! trailing day, in that order. Timestamps older than a day are pruned on
//! every check and every stats read.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::config::RateLimitConfig;
use crate::error::GateError;
use crate::observability::metrics;

const HOUR_SECS: i64 = 60 * 60;
const DAY_SECS: i64 = 24 * HOUR_SECS;

/// Which limit rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitWindow {
    MinInterval,
    Hourly,
    Daily,
}

impl LimitWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitWindow::MinInterval => "min_interval",
            LimitWindow::Hourly => "hourly",
            LimitWindow::Daily => "daily",
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(skip)]
    pub window: Option<LimitWindow>,
}

impl RateLimitDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            retry_after: None,
            window: None,
        }
    }

    fn deny(window: LimitWindow, reason: String, retry_after: u64) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            retry_after: Some(retry_after),
            window: Some(window),
        }
    }

    /// `Ok` when allowed, `RateLimitExceeded` otherwise.
    pub fn into_result(self) -> Result<(), GateError> {
        if self.allowed {
            return Ok(());
        }
        Err(GateError::RateLimitExceeded {
            reason: self.reason.unwrap_or_default(),
            retry_after: self.retry_after.unwrap_or_default(),
        })
    }
}

/// Read-only view of current usage against the limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimiterStats {
    pub hourly_requests: u32,
    pub daily_requests: u32,
    pub hourly_remaining: u32,
    pub daily_remaining: u32,
}

/// Process-wide sliding-window limiter.
#[derive(Debug)]
pub struct RateLimiter {
    records: Mutex<VecDeque<DateTime<Utc>>>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        tracing::info!(
            daily_limit = config.daily_limit,
            hourly_limit = config.hourly_limit,
            min_interval_secs = config.min_interval_secs,
            "RateLimiter initialized"
        );
        Self {
            records: Mutex::new(VecDeque::new()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn lock_pruned(&self, now: DateTime<Utc>) -> std::sync::MutexGuard<'_, VecDeque<DateTime<Utc>>> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let cutoff = now - Duration::seconds(DAY_SECS);
        // A backward wall-clock step can leave records out of order.
        records.retain(|ts| *ts > cutoff);
        records
    }

    /// Decide whether a new request may go to the backend right now.
    ///
    /// Does not consume quota; call [`RateLimiter::record_request`] once the
    /// backend call has succeeded.
    pub fn can_make_request(&self) -> RateLimitDecision {
        let now = self.clock.now();
        let records = self.lock_pruned(now);

        if let Some(last) = records.iter().max() {
            let elapsed = ((now - *last).num_milliseconds().max(0)) as f64 / 1000.0;
            let min_interval = self.config.min_interval_secs as f64;
            if elapsed < min_interval {
                let retry_after = (min_interval - elapsed).ceil() as u64;
                tracing::warn!(
                    elapsed_secs = elapsed,
                    min_interval_secs = self.config.min_interval_secs,
                    retry_after,
                    "Rate limit: minimum interval not met"
                );
                metrics::record_rate_limited(LimitWindow::MinInterval.as_str());
                return RateLimitDecision::deny(
                    LimitWindow::MinInterval,
                    format!("Minimum interval of {}s not met", self.config.min_interval_secs),
                    retry_after,
                );
            }
        }

        let hourly = count_within(&records, now, HOUR_SECS);
        if hourly >= self.config.hourly_limit {
            tracing::warn!(
                hourly_requests = hourly,
                limit = self.config.hourly_limit,
                "Rate limit: hourly limit exceeded"
            );
            metrics::record_rate_limited(LimitWindow::Hourly.as_str());
            return RateLimitDecision::deny(
                LimitWindow::Hourly,
                format!("Hourly limit of {} requests exceeded", self.config.hourly_limit),
                HOUR_SECS as u64,
            );
        }

        let daily = count_within(&records, now, DAY_SECS);
        if daily >= self.config.daily_limit {
            tracing::warn!(
                daily_requests = daily,
                limit = self.config.daily_limit,
                "Rate limit: daily limit exceeded"
            );
            metrics::record_rate_limited(LimitWindow::Daily.as_str());
            return RateLimitDecision::deny(
                LimitWindow::Daily,
                format!("Daily limit of {} requests exceeded", self.config.daily_limit),
                DAY_SECS as u64,
            );
        }

        RateLimitDecision::allow()
    }

    /// Consume one quota slot, stamped with the current instant.
    pub fn record_request(&self) {
        let now = self.clock.now();
        let mut records = self.lock_pruned(now);
        records.push_back(now);
        tracing::debug!(
            total_requests = records.len(),
            hourly_requests = count_within(&records, now, HOUR_SECS),
            daily_requests = count_within(&records, now, DAY_SECS),
            "Request recorded"
        );
    }

    pub fn stats(&self) -> RateLimiterStats {
        let now = self.clock.now();
        let records = self.lock_pruned(now);
        let hourly = count_within(&records, now, HOUR_SECS);
        let daily = count_within(&records, now, DAY_SECS);

        RateLimiterStats {
            hourly_requests: hourly,
            daily_requests: daily,
            hourly_remaining: self.config.hourly_limit.saturating_sub(hourly),
            daily_remaining: self.config.daily_limit.saturating_sub(daily),
        }
    }
}

fn count_within(records: &VecDeque<DateTime<Utc>>, now: DateTime<Utc>, window_secs: i64) -> u32 {
    let cutoff = now - Duration::seconds(window_secs);
    records.iter().filter(|ts| **ts > cutoff).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use chrono::TimeZone;

    fn limiter(config: RateLimitConfig) -> (RateLimiter, MockClock) {
        let clock = MockClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        (RateLimiter::new(config, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_first_request_allowed() {
        let (rl, _) = limiter(RateLimitConfig::default());
        assert!(rl.can_make_request().allowed);
    }

    #[test]
    fn test_min_interval_retry_after_rounds_up() {
        let (rl, clock) = limiter(RateLimitConfig::default());
        rl.record_request();
        clock.advance(Duration::milliseconds(10_500));

        let decision = rl.can_make_request();
        assert!(!decision.allowed);
        assert_eq!(decision.window, Some(LimitWindow::MinInterval));
        assert_eq!(decision.retry_after, Some(20));
        assert_eq!(decision.reason.as_deref(), Some("Minimum interval of 30s not met"));

        clock.advance(Duration::milliseconds(19_500));
        assert!(rl.can_make_request().allowed);
    }

    #[test]
    fn test_check_does_not_consume_quota() {
        let (rl, _) = limiter(RateLimitConfig::default());
        for _ in 0..5 {
            assert!(rl.can_make_request().allowed);
        }
        assert_eq!(rl.stats().daily_requests, 0);
    }

    #[test]
    fn test_hourly_limit_then_recovery() {
        let config = RateLimitConfig {
            daily_limit: 30,
            hourly_limit: 10,
            min_interval_secs: 30,
        };
        let (rl, clock) = limiter(config);
        for _ in 0..10 {
            assert!(rl.can_make_request().allowed);
            rl.record_request();
            clock.advance(Duration::seconds(60));
        }

        let decision = rl.can_make_request();
        assert_eq!(decision.window, Some(LimitWindow::Hourly));
        assert_eq!(decision.retry_after, Some(3600));

        // oldest record leaves the hour window after 60 minutes
        clock.advance(Duration::minutes(50) + Duration::seconds(1));
        assert!(rl.can_make_request().allowed);
    }

    #[test]
    fn test_daily_limit_and_pruning() {
        let config = RateLimitConfig {
            daily_limit: 3,
            hourly_limit: 3,
            min_interval_secs: 1,
        };
        let (rl, clock) = limiter(config);
        for _ in 0..3 {
            rl.record_request();
            clock.advance(Duration::hours(2));
        }

        let decision = rl.can_make_request();
        assert_eq!(decision.window, Some(LimitWindow::Daily));
        assert_eq!(decision.retry_after, Some(86_400));
        assert_eq!(
            decision.clone().into_result().unwrap_err().kind(),
            crate::error::ErrorKind::RateLimitExceeded
        );

        clock.advance(Duration::hours(19));
        let stats = rl.stats();
        assert_eq!(stats.daily_requests, 2);
        assert_eq!(stats.daily_remaining, 1);
        assert!(rl.can_make_request().allowed);
    }

    #[test]
    fn test_interval_checked_before_hourly() {
        let config = RateLimitConfig {
            daily_limit: 10,
            hourly_limit: 1,
            min_interval_secs: 30,
        };
        let (rl, clock) = limiter(config);
        rl.record_request();
        clock.advance(Duration::seconds(5));
        assert_eq!(rl.can_make_request().window, Some(LimitWindow::MinInterval));
        clock.advance(Duration::seconds(30));
        assert_eq!(rl.can_make_request().window, Some(LimitWindow::Hourly));
    }

    #[test]
    fn test_stats_remaining_floor_at_zero() {
        let config = RateLimitConfig {
            daily_limit: 2,
            hourly_limit: 1,
            min_interval_secs: 0,
        };
        let (rl, _) = limiter(config);
        rl.record_request();
        rl.record_request();
        rl.record_request();

        let stats = rl.stats();
        assert_eq!(stats.hourly_requests, 3);
        assert_eq!(stats.hourly_remaining, 0);
        assert_eq!(stats.daily_remaining, 0);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let (rl, _) = limiter(RateLimitConfig::default());
        let json = serde_json::to_value(rl.stats()).unwrap();
        assert_eq!(json["hourlyRemaining"], 10);
        assert_eq!(json["dailyRemaining"], 30);
    }

    #[test]
    fn test_prunes_out_of_order_records_after_clock_step_back() {
        let (rl, clock) = limiter(RateLimitConfig::default());
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        rl.record_request();
        clock.set(t0 - Duration::hours(2));
        rl.record_request();

        clock.set(t0 + Duration::hours(23));
        let stats = rl.stats();
        assert_eq!(stats.daily_requests, 1);
        assert_eq!(rl.records.lock().unwrap().len(), 1);
    }
}
