//! Provider configuration from TOML (`[providers.<id>]` sections)

use super::ConfigValidationError;
use fanout_application::{ProviderLimits, RateLimit};
use serde::{Deserialize, Serialize};

/// OpenAI-compatible endpoints known without configuration.
const KNOWN_BASE_URLS: &[(&str, &str)] = &[
    ("openai", "https://api.openai.com/v1"),
    ("openrouter", "https://openrouter.ai/api/v1"),
    ("groq", "https://api.groq.com/openai/v1"),
    ("together", "https://api.together.xyz/v1"),
    ("mistral", "https://api.mistral.ai/v1"),
    ("ollama", "http://localhost:11434/v1"),
];

/// One provider endpoint and its admission limits.
///
/// # Example
///
/// ```toml
/// [providers.openai]
/// api_key_env = "OPENAI_API_KEY"
/// requests_per_second = 2.0
/// burst = 4
/// max_in_flight = 3
///
/// [providers.local]
/// base_url = "http://localhost:8080/v1"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Base URL of the OpenAI-compatible API (default: well-known URL for the id)
    pub base_url: Option<String>,
    /// Environment variable holding the API key (default: `<ID>_API_KEY`)
    pub api_key_env: Option<String>,
    pub requests_per_second: Option<f64>,
    /// Bucket capacity (default: 1)
    pub burst: Option<u32>,
    /// Simultaneous in-flight calls to this provider
    pub max_in_flight: Option<usize>,
}

impl FileProviderConfig {
    /// Configured base URL, falling back to the well-known one for `id`.
    pub fn resolve_base_url(&self, id: &str) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| known_base_url(id).map(str::to_string))
            .map(|url| url.trim_end_matches('/').to_string())
    }

    pub fn resolve_api_key_env(&self, id: &str) -> String {
        self.api_key_env.clone().unwrap_or_else(|| {
            format!("{}_API_KEY", id.to_uppercase().replace(['-', '.'], "_"))
        })
    }

    pub fn to_limits(&self) -> ProviderLimits {
        let mut limits = ProviderLimits::default();
        if let Some(rate) = self
            .requests_per_second
            .and_then(|rps| RateLimit::new(rps, self.burst.unwrap_or(1)))
        {
            limits = limits.with_rate(rate);
        }
        if let Some(max) = self.max_in_flight {
            limits = limits.with_max_in_flight(max);
        }
        limits
    }

    pub(super) fn validate(&self, id: &str, issues: &mut Vec<ConfigValidationError>) {
        if let Some(rps) = self.requests_per_second
            && !RateLimit::is_valid_rate(rps)
        {
            issues.push(ConfigValidationError::InvalidRate {
                field: format!("providers.{}.requests_per_second", id),
                value: rps,
            });
        }
        if self.burst == Some(0) {
            issues.push(ConfigValidationError::ZeroBurst {
                field: format!("providers.{}.burst", id),
            });
        }
        if self.max_in_flight == Some(0) {
            issues.push(ConfigValidationError::ZeroInFlight {
                field: format!("providers.{}.max_in_flight", id),
            });
        }
    }
}

pub fn known_base_url(id: &str) -> Option<&'static str> {
    KNOWN_BASE_URLS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, url)| *url)
}
