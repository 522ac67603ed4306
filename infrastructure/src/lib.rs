//! Infrastructure layer for llm-fanout
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP model clients, file and stdin prompt
//! sources, and configuration file loading.

pub mod config;
pub mod prompt;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig, FileProviderConfig,
    FileRetryConfig, FileRunConfig,
};
pub use prompt::{FilePromptSource, StdinPromptSource};
pub use providers::{OpenAiCompatibleClient, ProviderError, RoutingModelClient};
