//! Domain layer for llm-fanout
//!
//! This crate contains the core entities and value objects of a fan-out run.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Target**: one `(provider, model)` pair invoked in a run
//! - **ModelResult**: the final state of one target; content and error are
//!   mutually exclusive, so a failure can never be mistaken for output
//! - **RunSummary**: exact success/failure accounting over all targets plus
//!   the optional synthesis result

pub mod config;
pub mod core;
pub mod execution;
pub mod prompt;

// Re-export commonly used types
pub use config::OutputFormat;
pub use self::core::{error::DomainError, prompt::Prompt, target::Target};
pub use execution::{
    category::{CategorizedError, ErrorCategory},
    content::Content,
    phase::{Phase, WorkerState},
    result::{AttemptRecord, CallOutcome, ModelResult},
    summary::{RunOutcome, RunSummary, SkipReason, SynthesisInput, SynthesisOutcome},
};
pub use prompt::PromptTemplate;
