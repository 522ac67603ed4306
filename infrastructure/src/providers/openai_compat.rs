//! Client for OpenAI-compatible Chat Completions endpoints.
//!
//! Works against any server exposing `POST {base_url}/chat/completions`
//! (OpenAI, OpenRouter, Groq, vLLM, Ollama, LM Studio, ...). One prompt is
//! sent as a single user message and the first choice's text is returned.

use super::ProviderError;
use super::error_mapping::{classify_status, classify_transport, parse_retry_after};
use async_trait::async_trait;
use fanout_application::ModelClient;
use fanout_domain::{CategorizedError, Target};
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// One provider endpoint. The model id comes from each call's target.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    provider_id: String,
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(
        provider_id: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            provider_id: provider_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    async fn complete(&self, model_id: &str, prompt: &str) -> Result<String, CategorizedError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: model_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let text = response.text().await.unwrap_or_default();
            debug!(
                "Provider {} returned HTTP {} for {}",
                self.provider_id,
                status.as_u16(),
                model_id
            );
            return Err(classify_status(status.as_u16(), &text, retry_after));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| classify_transport(&e))?;
        extract_text(parsed)
    }
}

fn extract_text(response: ChatResponse) -> Result<String, CategorizedError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CategorizedError::content_rejected("response contained no choices"))?;

    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(CategorizedError::content_rejected("response filtered"));
    }

    choice
        .message
        .and_then(|m| m.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| CategorizedError::content_rejected("empty response"))
}

#[async_trait]
impl ModelClient for OpenAiCompatibleClient {
    async fn invoke(
        &self,
        target: &Target,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, CategorizedError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CategorizedError::cancelled()),
            result = self.complete(target.model_id(), prompt) => result,
        }
    }
}
