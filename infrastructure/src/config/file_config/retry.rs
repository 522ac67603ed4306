//! Retry configuration from TOML (`[retry]` section)

use super::ConfigValidationError;
use fanout_application::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw retry configuration from TOML
///
/// # Example
///
/// ```toml
/// [retry]
/// max_attempts = 3
/// base_delay_ms = 1000
/// max_delay_ms = 30000
/// jitter = 0.2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    /// Total attempts per target, including the first
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Fractional jitter in [0, 1]
    pub jitter: f64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            jitter: policy.jitter,
        }
    }
}

impl FileRetryConfig {
    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_jitter(self.jitter)
    }

    pub(super) fn validate(&self, issues: &mut Vec<ConfigValidationError>) {
        if self.max_attempts == 0 {
            issues.push(ConfigValidationError::ZeroMaxAttempts);
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            issues.push(ConfigValidationError::InvalidJitter(self.jitter));
        }
        if self.base_delay_ms > self.max_delay_ms {
            issues.push(ConfigValidationError::DelayOrder {
                base_ms: self.base_delay_ms,
                max_ms: self.max_delay_ms,
            });
        }
    }
}
