//! Failure taxonomy shared by clients, the retry policy and reporting.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Category of a failed call attempt.
///
/// Clients classify every failure into one of these before it reaches the
/// orchestrator; retry decisions and reporting only ever look at the
/// category, never at provider-specific error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Network blip or timeout.
    Transient,
    /// Provider-side throttling (HTTP 429 or equivalent).
    RateLimited,
    /// Provider 5xx.
    ServerError,
    /// Invalid or missing credentials.
    Auth,
    /// Unknown model or provider.
    NotFound,
    /// Safety/policy block, context length exceeded, or an empty response.
    ContentRejected,
    /// The run was cancelled before this target finished.
    Cancelled,
}

impl ErrorCategory {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCategory::Transient | ErrorCategory::RateLimited | ErrorCategory::ServerError
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transient => "transient",
            ErrorCategory::RateLimited => "rate_limited",
            ErrorCategory::ServerError => "server_error",
            ErrorCategory::Auth => "auth",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::ContentRejected => "content_rejected",
            ErrorCategory::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error tagged with its [`ErrorCategory`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{category}: {message}")]
pub struct CategorizedError {
    pub category: ErrorCategory,
    pub message: String,
    /// Delay suggested by the provider (e.g. a `Retry-After` header).
    #[serde(skip)]
    pub retry_after: Option<Duration>,
}

impl CategorizedError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Transient, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::RateLimited, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Auth, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NotFound, message)
    }

    pub fn content_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ContentRejected, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorCategory::Cancelled, "run cancelled")
    }

    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}
