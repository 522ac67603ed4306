//! Application-level configuration.
//!
//! This module provides configuration types that control how a run behaves:
//!
//! - [`RunOptions`]: concurrency, timeouts, rate limiter, synthesis target
//! - [`RetryPolicy`]: backoff and attempt limits per error category

pub mod retry_policy;
pub mod run_options;

pub use retry_policy::{RetryDecision, RetryPolicy};
pub use run_options::{DEFAULT_MAX_CONCURRENCY, RunOptions};
