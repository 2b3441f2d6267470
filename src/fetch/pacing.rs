//! Request pacing and retry timing
//!
//! All delays are expressed in "time units" so that production runs can pace
//! requests in seconds while tests run the same schedule in milliseconds.

use crate::config::IngestSettings;
use rand::Rng;
use std::time::Duration;

/// Pre-request delay range, in time units
const PRE_REQUEST_DELAY: (f64, f64) = (3.0, 7.0);
/// Jitter added on top of exponential backoff, in time units
const BACKOFF_JITTER: (f64, f64) = (1.0, 3.0);
/// Cooldown after a non-HTML response, in time units
const NON_HTML_COOLDOWN: (f64, f64) = (4.0, 8.0);
/// Cooldown after a retryable error, in time units
const ERROR_COOLDOWN: (f64, f64) = (5.0, 10.0);

/// Longest configurable random delay, in time units
pub const MAX_DELAY_UNITS: f64 = 3600.0;

/// Retry budget and delay schedule for HTML fetches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per URL
    pub max_attempts: u32,
    /// Attempts during which generic failures are retried
    pub soft_retry_attempts: u32,
    /// Length of one time unit
    pub unit: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &IngestSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            soft_retry_attempts: settings.soft_retry_attempts,
            unit: settings.time_unit(),
        }
    }

    /// Randomized pause before the first request to a page
    pub fn pre_request_delay(&self) -> Duration {
        self.units_between(PRE_REQUEST_DELAY.0, PRE_REQUEST_DELAY.1)
    }

    /// Exponential backoff before attempt `attempt` (0-based):
    /// `2^attempt + random(1, 3)` time units
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponential = 2f64.powi(attempt.min(30) as i32);
        self.scaled(exponential)
            .saturating_add(self.units_between(BACKOFF_JITTER.0, BACKOFF_JITTER.1))
    }

    pub fn non_html_cooldown(&self) -> Duration {
        self.units_between(NON_HTML_COOLDOWN.0, NON_HTML_COOLDOWN.1)
    }

    pub fn error_cooldown(&self) -> Duration {
        self.units_between(ERROR_COOLDOWN.0, ERROR_COOLDOWN.1)
    }

    /// Whether a generic failure on attempt `attempt` (0-based) may be retried
    pub fn allows_soft_retry(&self, attempt: u32) -> bool {
        attempt < self.soft_retry_attempts
    }

    /// A uniformly random duration between `min` and `max` time units
    ///
    /// Bounds are clamped to `0..=MAX_DELAY_UNITS`; NaN counts as zero.
    pub fn units_between(&self, min: f64, max: f64) -> Duration {
        let (min, max) = (clamp_units(min), clamp_units(max));
        let units = if max > min {
            rand::rng().random_range(min..=max)
        } else {
            min
        };
        self.scaled(units)
    }

    /// `units` time units, saturating at `Duration::MAX`
    fn scaled(&self, units: f64) -> Duration {
        Duration::try_from_secs_f64(self.unit.as_secs_f64() * units).unwrap_or(Duration::MAX)
    }
}

fn clamp_units(units: f64) -> f64 {
    if units.is_nan() {
        0.0
    } else {
        units.clamp(0.0, MAX_DELAY_UNITS)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&IngestSettings::default())
    }
}
