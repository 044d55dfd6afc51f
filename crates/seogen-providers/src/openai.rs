//! OpenAI chat-completions client.
//!
//! Sends the prompt as a single user message to `{api_base}/chat/completions`
//! with bearer auth and returns the first choice's text.

use async_trait::async_trait;
use tracing::{debug, error};

use seogen_core::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use seogen_core::{GenerationError, Result};

use crate::registry::{ProviderDescriptor, ProviderKind};
use crate::traits::{RequestConfig, TextProvider};

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    display_name: String,
    config: RequestConfig,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    /// Build a client from a resolved descriptor.
    ///
    /// Fails with `UnavailableProvider` when the descriptor has no credential.
    pub fn new(descriptor: &ProviderDescriptor, config: RequestConfig) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), descriptor, config)
    }

    /// Same as [`new`](Self::new) but reuses an existing connection pool.
    pub fn with_client(
        client: reqwest::Client,
        descriptor: &ProviderDescriptor,
        config: RequestConfig,
    ) -> Result<Self> {
        let api_key = descriptor.require_credential()?.to_string();
        Ok(Self {
            client,
            api_base: descriptor.api_base.clone(),
            api_key,
            model: descriptor.model_id.clone(),
            display_name: descriptor.display_name.clone(),
            config,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    fn call_error(&self, message: impl Into<String>) -> GenerationError {
        GenerationError::provider_call(&self.display_name, message)
    }
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        debug!(provider = %self.display_name, model = %self.model, "calling provider");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %self.display_name, error = %e, "HTTP request failed");
                self.call_error(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(provider = %self.display_name, status = %status, body = %text, "API error");
            return Err(self.call_error(format!("{status}: {text}")));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| self.call_error(format!("invalid response body: {e}")))?;

        let text = parsed
            .first_text()
            .ok_or_else(|| self.call_error("response contained no choices"))?;

        debug!(provider = %self.display_name, chars = text.len(), "provider response received");
        Ok(text)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
