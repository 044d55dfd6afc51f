//! Google Gemini `generateContent` client.
//!
//! Request: `POST {api_base}/models/{model}:generateContent?key={key}`
//! with `{"contents":[{"role":"user","parts":[{"text": prompt}]}]}`.
//! The answer text lives at `candidates[0].content.parts[0].text`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use seogen_core::{GenerationError, Result};

use crate::registry::{ProviderDescriptor, ProviderKind};
use crate::traits::{RequestConfig, TextProvider};

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

// ─────────────────────────────────────────────
// GeminiProvider
// ─────────────────────────────────────────────

pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    display_name: String,
    config: RequestConfig,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
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

    /// URL without the key; the key is attached as a query parameter so it
    /// never appears in logged URLs.
    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    fn call_error(&self, message: impl Into<String>) -> GenerationError {
        GenerationError::provider_call(&self.display_name, message)
    }
}

#[async_trait]
impl TextProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        };

        let url = self.generate_url();
        debug!(provider = %self.display_name, url = %url, "calling provider");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            // reqwest errors carry the full URL, key included.
            .map_err(|e| {
                let e = e.without_url();
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

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| self.call_error(format!("invalid response body: {}", e.without_url())))?;

        let text = parsed
            .first_text()
            .ok_or_else(|| self.call_error("response contained no candidate text"))?;

        debug!(provider = %self.display_name, chars = text.len(), "provider response received");
        Ok(text)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
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
