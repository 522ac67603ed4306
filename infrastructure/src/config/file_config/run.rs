//! Run configuration from TOML (`[run]` section)

use super::ConfigValidationError;
use fanout_application::DEFAULT_MAX_CONCURRENCY;
use fanout_domain::Target;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw run configuration from TOML
///
/// # Example
///
/// ```toml
/// [run]
/// targets = ["openai/gpt-4o", "groq/llama-3.3-70b-versatile"]
/// synthesis = "openai/gpt-4o"
/// max_concurrency = 5
/// call_timeout_seconds = 120
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunConfig {
    /// Targets as `"<provider>/<model>"` strings
    pub targets: Vec<String>,
    /// Model that consolidates the successful outputs
    pub synthesis: Option<String>,
    /// Global cap on simultaneous in-flight calls
    pub max_concurrency: usize,
    /// Per-call timeout in seconds
    pub call_timeout_seconds: Option<u64>,
}

impl Default for FileRunConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            synthesis: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            call_timeout_seconds: None,
        }
    }
}

impl FileRunConfig {
    pub fn parse_targets(&self) -> Result<Vec<Target>, ConfigValidationError> {
        self.targets
            .iter()
            .map(|s| parse_target("run.targets", s))
            .collect()
    }

    pub fn parse_synthesis(&self) -> Result<Option<Target>, ConfigValidationError> {
        self.synthesis
            .as_deref()
            .map(|s| parse_target("run.synthesis", s))
            .transpose()
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_seconds.map(Duration::from_secs)
    }

    pub(super) fn validate(&self, issues: &mut Vec<ConfigValidationError>) {
        if self.max_concurrency == 0 {
            issues.push(ConfigValidationError::ZeroConcurrency);
        }
        if self.call_timeout_seconds == Some(0) {
            issues.push(ConfigValidationError::ZeroTimeout {
                field: "run.call_timeout_seconds".to_string(),
            });
        }
        for target in &self.targets {
            if let Err(e) = parse_target("run.targets", target) {
                issues.push(e);
            }
        }
        if let Err(e) = self.parse_synthesis() {
            issues.push(e);
        }
    }
}

pub(super) fn parse_target(field: &str, value: &str) -> Result<Target, ConfigValidationError> {
    value
        .parse()
        .map_err(|e: fanout_domain::DomainError| ConfigValidationError::InvalidTarget {
            field: field.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets_keeps_slashes_in_model_id() {
        let config = FileRunConfig {
            targets: vec![
                "openai/gpt-4o".to_string(),
                "openrouter/meta-llama/llama-3.1-70b".to_string(),
            ],
            ..Default::default()
        };

        let targets = config.parse_targets().unwrap();
        assert_eq!(targets[0], Target::new("openai", "gpt-4o"));
        assert_eq!(targets[1].provider_id(), "openrouter");
        assert_eq!(targets[1].model_id(), "meta-llama/llama-3.1-70b");
    }

    #[test]
    fn test_malformed_synthesis_target() {
        let config = FileRunConfig {
            synthesis: Some("gpt-4o".to_string()),
            ..Default::default()
        };

        let err = config.parse_synthesis().unwrap_err();
        assert!(matches!(
            err,
            ConfigValidationError::InvalidTarget { ref field, .. } if field == "run.synthesis"
        ));
    }
}
