//! Default admission limits from TOML (`[rate_limit]` section)

use super::ConfigValidationError;
use fanout_application::{ProviderLimits, RateLimit};
use serde::{Deserialize, Serialize};

/// Limits for providers without their own `[providers.<id>]` rate.
///
/// # Example
///
/// ```toml
/// [rate_limit]
/// requests_per_second = 1.0
/// burst = 2
/// reject_unknown_providers = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRateLimitConfig {
    pub requests_per_second: Option<f64>,
    pub burst: Option<u32>,
    /// Fail targets whose provider has no configured limits
    pub reject_unknown_providers: bool,
}

impl FileRateLimitConfig {
    pub fn default_limits(&self) -> Option<ProviderLimits> {
        self.requests_per_second
            .and_then(|rps| RateLimit::new(rps, self.burst.unwrap_or(1)))
            .map(|rate| ProviderLimits::default().with_rate(rate))
    }

    pub(super) fn validate(&self, issues: &mut Vec<ConfigValidationError>) {
        if let Some(rps) = self.requests_per_second
            && !RateLimit::is_valid_rate(rps)
        {
            issues.push(ConfigValidationError::InvalidRate {
                field: "rate_limit.requests_per_second".to_string(),
                value: rps,
            });
        }
        if self.burst == Some(0) {
            issues.push(ConfigValidationError::ZeroBurst {
                field: "rate_limit.burst".to_string(),
            });
        }
    }
}
