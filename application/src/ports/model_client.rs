//! Model client port
//!
//! Defines the interface for one request/response cycle against a provider.

use async_trait::async_trait;
use fanout_domain::{CategorizedError, Target};
use tokio_util::sync::CancellationToken;

/// Client for a single call to one target.
///
/// Implementations (adapters) live in the infrastructure layer and must
/// classify every failure into an [`ErrorCategory`](fanout_domain::ErrorCategory).
/// The orchestrator races each call against `cancel` itself, so
/// implementations may ignore it, but should stop work early when they can.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(
        &self,
        target: &Target,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, CategorizedError>;
}
