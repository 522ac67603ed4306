//! Retry policy: decides whether and when a failed attempt is retried.
//!
//! The policy is stateless: every decision is a function of the error
//! category and the attempt number (plus random jitter), so one instance can
//! be cloned into every worker.

use fanout_domain::{CategorizedError, ErrorCategory};
use rand::Rng;
use std::time::Duration;

/// Outcome of consulting the [`RetryPolicy`] after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for `delay`, then try again
    Retry { delay: Duration },
    /// The failure is final
    GiveUp,
}

/// Exponential backoff with a cap, optional jitter and a hard attempt limit.
///
/// `delay = min(max_delay, base_delay * 2^(attempt - 1))`, then scaled by a
/// uniform factor in `[1 - jitter, 1 + jitter]` and clamped to `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts allowed per target, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fractional jitter in `[0, 1]`; `0.2` means ±20%.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Non-finite values disable jitter.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = bounded_jitter(jitter);
        self
    }

    // ==================== Decisions ====================

    /// Decide for a bare category. `attempt` is the 1-based number of the
    /// attempt that just failed.
    ///
    /// Returns `(false, Duration::ZERO)` for permanent categories and once
    /// `max_attempts` has been reached.
    pub fn should_retry(&self, category: ErrorCategory, attempt: u32) -> (bool, Duration) {
        if !self.allows_another(category, attempt) {
            return (false, Duration::ZERO);
        }
        (true, self.jittered(self.backoff_delay(attempt)))
    }

    /// Decide for a full error, honouring any provider `retry_after` hint.
    pub fn decide(&self, error: &CategorizedError, attempt: u32) -> RetryDecision {
        if !self.allows_another(error.category, attempt) {
            return RetryDecision::GiveUp;
        }

        let mut delay = self.backoff_delay(attempt);
        if let Some(hint) = error.retry_after {
            delay = delay.max(hint).min(self.max_delay);
        }

        RetryDecision::Retry {
            delay: self.jittered(delay),
        }
    }

    /// Deterministic backoff before jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn allows_another(&self, category: ErrorCategory, attempt: u32) -> bool {
        category.is_retryable() && attempt < self.max_attempts
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let jitter = bounded_jitter(self.jitter);
        if jitter == 0.0 || delay.is_zero() {
            return delay;
        }
        let factor = 1.0 + rand::thread_rng().gen_range(-jitter..=jitter);
        let secs = (delay.as_secs_f64() * factor).clamp(0.0, self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

fn bounded_jitter(jitter: f64) -> f64 {
    if jitter.is_finite() {
        jitter.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
