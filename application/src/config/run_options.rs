//! Run options: per-run knobs for the orchestrator.

use super::retry_policy::RetryPolicy;
use crate::rate_limit::RateLimiter;
use fanout_domain::Target;
use std::sync::Arc;
use std::time::Duration;

/// Default number of targets driven at the same time.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Options for a single run.
///
/// The rate limiter is caller-owned: share one `Arc` between runs to share
/// provider budgets, or give each run its own for isolation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Global cap on concurrently active targets, independent of any
    /// per-provider in-flight limit.
    pub max_concurrency: usize,
    /// Deadline for a single call, shorter than the run's own lifetime.
    pub call_timeout: Option<Duration>,
    pub rate_limiter: Arc<RateLimiter>,
    pub retry_policy: RetryPolicy,
    /// Model that consolidates the successful outputs; not counted as a
    /// primary target.
    pub synthesis_target: Option<Target>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            call_timeout: None,
            rate_limiter: Arc::new(RateLimiter::unlimited()),
            retry_policy: RetryPolicy::default(),
            synthesis_target: None,
        }
    }
}

impl RunOptions {
    // ==================== Builder Methods ====================

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = limiter;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_synthesis_target(mut self, target: Target) -> Self {
        self.synthesis_target = Some(target);
        self
    }
}
