//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types
//! ([`RunOptions`], [`RateLimitConfig`]) only after validation.

mod models;
mod output;
mod providers;
mod rate_limit;
mod retry;
mod run;

pub use models::FileModelLimitConfig;
pub use output::FileOutputConfig;
pub use providers::{FileProviderConfig, known_base_url};
pub use rate_limit::FileRateLimitConfig;
pub use retry::FileRetryConfig;
pub use run::FileRunConfig;

use fanout_application::{RateLimitConfig, RateLimiter, RunOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("{field}: timeout cannot be 0")]
    ZeroTimeout { field: String },

    #[error("run.max_concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("retry.max_attempts must be at least 1")]
    ZeroMaxAttempts,

    #[error("retry.jitter must be within [0, 1], got {0}")]
    InvalidJitter(f64),

    #[error("retry.base_delay_ms ({base_ms}) exceeds retry.max_delay_ms ({max_ms})")]
    DelayOrder { base_ms: u64, max_ms: u64 },

    #[error("{field}: rate must be positive and at least one request per day, got {value}")]
    InvalidRate { field: String, value: f64 },

    #[error("{field}: burst must be at least 1")]
    ZeroBurst { field: String },

    #[error("{field}: max_in_flight must be at least 1")]
    ZeroInFlight { field: String },

    #[error("{field}: {message}")]
    InvalidTarget { field: String, message: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Targets, synthesis and concurrency
    pub run: FileRunConfig,
    /// Backoff and attempt limits
    pub retry: FileRetryConfig,
    /// Endpoints and per-provider limits, keyed by provider id
    pub providers: BTreeMap<String, FileProviderConfig>,
    /// Per-model limits, keyed by `"<provider>/<model>"`
    pub models: BTreeMap<String, FileModelLimitConfig>,
    /// Limits for providers without their own
    pub rate_limit: FileRateLimitConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every detected issue.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        self.run.validate(&mut issues);
        self.retry.validate(&mut issues);
        for (id, provider) in &self.providers {
            provider.validate(id, &mut issues);
        }
        for (key, model) in &self.models {
            model.validate(key, &mut issues);
        }
        self.rate_limit.validate(&mut issues);

        issues
    }

    /// Admission limits described by `[providers]`, `[models]` and
    /// `[rate_limit]`.
    pub fn to_rate_limit_config(&self) -> Result<RateLimitConfig, ConfigValidationError> {
        let mut config = RateLimitConfig::default();

        for (id, provider) in &self.providers {
            config = config.with_provider(id.clone(), provider.to_limits());
        }
        for (key, model) in &self.models {
            let target = run::parse_target("models", key)?;
            let rate = model
                .to_rate_limit()
                .ok_or_else(|| ConfigValidationError::InvalidRate {
                    field: format!("models.\"{}\".requests_per_second", key),
                    value: model.requests_per_second,
                })?;
            config = config.with_model(target, rate);
        }
        if let Some(limits) = self.rate_limit.default_limits() {
            config = config.with_default_provider(limits);
        }
        if self.rate_limit.reject_unknown_providers {
            config = config.rejecting_unknown_providers();
        }

        Ok(config)
    }

    /// Run options with a freshly built [`RateLimiter`].
    pub fn to_run_options(&self) -> Result<RunOptions, ConfigValidationError> {
        let limiter = RateLimiter::new(self.to_rate_limit_config()?);

        let mut options = RunOptions::default()
            .with_max_concurrency(self.run.max_concurrency)
            .with_call_timeout(self.run.call_timeout())
            .with_rate_limiter(Arc::new(limiter))
            .with_retry_policy(self.retry.to_retry_policy());
        if let Some(target) = self.run.parse_synthesis()? {
            options = options.with_synthesis_target(target);
        }

        Ok(options)
    }
}
