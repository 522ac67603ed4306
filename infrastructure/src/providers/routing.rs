//! Dispatch by provider id.

use async_trait::async_trait;
use fanout_application::ModelClient;
use fanout_domain::{CategorizedError, Target};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Routes each call to the client registered for `target.provider_id`.
#[derive(Default)]
pub struct RoutingModelClient {
    clients: HashMap<String, Arc<dyn ModelClient>>,
}

impl RoutingModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(
        mut self,
        provider_id: impl Into<String>,
        client: Arc<dyn ModelClient>,
    ) -> Self {
        self.clients.insert(provider_id.into(), client);
        self
    }

    pub fn has_provider(&self, provider_id: &str) -> bool {
        self.clients.contains_key(provider_id)
    }

    /// Registered provider ids, sorted
    pub fn providers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl ModelClient for RoutingModelClient {
    async fn invoke(
        &self,
        target: &Target,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, CategorizedError> {
        let client = self.clients.get(target.provider_id()).ok_or_else(|| {
            CategorizedError::not_found(format!(
                "no client configured for provider '{}'",
                target.provider_id()
            ))
        })?;
        client.invoke(target, prompt, cancel).await
    }
}
