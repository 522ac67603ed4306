//! Per-model rate limits from TOML (`[models."<provider>/<model>"]` sections)

use super::ConfigValidationError;
use fanout_application::RateLimit;
use serde::{Deserialize, Serialize};

/// Extra bucket for one model, applied after its provider's limits.
///
/// # Example
///
/// ```toml
/// [models."openai/gpt-4o"]
/// requests_per_second = 0.5
/// burst = 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileModelLimitConfig {
    pub requests_per_second: f64,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_burst() -> u32 {
    1
}

impl FileModelLimitConfig {
    pub fn to_rate_limit(&self) -> Option<RateLimit> {
        RateLimit::new(self.requests_per_second, self.burst)
    }

    pub(super) fn validate(&self, key: &str, issues: &mut Vec<ConfigValidationError>) {
        if !RateLimit::is_valid_rate(self.requests_per_second) {
            issues.push(ConfigValidationError::InvalidRate {
                field: format!("models.\"{}\".requests_per_second", key),
                value: self.requests_per_second,
            });
        }
        if self.burst == 0 {
            issues.push(ConfigValidationError::ZeroBurst {
                field: format!("models.\"{}\".burst", key),
            });
        }
        if let Err(e) = super::run::parse_target("models", key) {
            issues.push(e);
        }
    }
}
