//! Text provider trait: "send one prompt, get one text answer".
//!
//! Every backend (Gemini, OpenAI, Claude) implements this trait. The
//! generator never sees wire formats; it only hands over a prompt string.

use async_trait::async_trait;

use seogen_core::Result;

use crate::registry::ProviderKind;

/// Sampling parameters passed to every provider call.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Send a single user prompt and return the raw text answer.
    ///
    /// Transport failures, non-2xx statuses, and responses without text
    /// all surface as `GenerationError::ProviderCall`.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Which provider this client talks to.
    fn kind(&self) -> ProviderKind;

    /// Display name for logging.
    fn display_name(&self) -> &str;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;
}
