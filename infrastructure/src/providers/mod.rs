//! Model clients
//!
//! - [`OpenAiCompatibleClient`]: any `/chat/completions` endpoint
//! - [`RoutingModelClient`]: dispatches by provider id

mod error_mapping;
pub mod openai_compat;
pub mod routing;

pub use openai_compat::OpenAiCompatibleClient;
pub use routing::RoutingModelClient;

use thiserror::Error;

/// Errors raised while building a client (never during a call).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("No base_url configured for provider '{0}'")]
    MissingBaseUrl(String),
}
