//! Application layer for llm-fanout
//!
//! This crate contains use cases, port definitions, rate limiting and
//! run configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod rate_limit;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_MAX_CONCURRENCY, RetryDecision, RetryPolicy, RunOptions};
pub use ports::{
    model_client::ModelClient,
    progress::{NoProgress, ProgressNotifier},
    prompt_source::{PromptSource, PromptSourceError, StaticPromptSource},
};
pub use rate_limit::{
    AdmissionError, AdmissionPermit, ProviderLimits, RateLimit, RateLimitConfig, RateLimiter,
};
pub use use_cases::run_fanout::{RunError, RunFanoutUseCase};
pub use use_cases::synthesize::SynthesisCoordinator;
