//! Error taxonomy shared by the provider, generator, and CLI layers.
//!
//! None of these are recovered inside the library: every failure surfaces
//! to the caller with a human-readable message.

use thiserror::Error;

use crate::types::ContentKind;
use crate::utils::clip;

/// Result alias used across the Seogen crates.
pub type Result<T, E = GenerationError> = std::result::Result<T, E>;

/// Everything that can go wrong while resolving a provider or generating content.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The requested provider tag is not one we know about.
    #[error("Model {0} not supported.")]
    UnsupportedProvider(String),

    /// Known provider, but no API key is configured for it.
    #[error("Model {0} is not available. API key not configured.")]
    UnavailableProvider(String),

    /// Known provider whose integration is deliberately unfinished.
    #[error("{0} integration not implemented yet")]
    NotImplemented(String),

    /// The provider answered, but the payload could not be parsed for `kind`.
    #[error("malformed {kind} response from provider: {source} (raw: {})", clip(.raw, 200))]
    MalformedResponse {
        kind: ContentKind,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    /// Transport, HTTP status, or response-shape failure from a provider.
    #[error("{provider} request failed: {message}")]
    ProviderCall { provider: String, message: String },

    /// Request validation: the topic (or chat message) was blank.
    #[error("topic must not be empty")]
    EmptyTopic,

    /// A `generate_all` branch failed; wraps the first error seen.
    #[error("Failed to generate all content: {0}")]
    Aggregate(#[source] Box<GenerationError>),
}

impl GenerationError {
    /// Build a `ProviderCall` error.
    pub fn provider_call(provider: impl Into<String>, message: impl Into<String>) -> Self {
        GenerationError::ProviderCall {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Unwrap any `Aggregate` layers and return the error that actually happened.
    pub fn root_cause(&self) -> &GenerationError {
        match self {
            GenerationError::Aggregate(inner) => inner.root_cause(),
            other => other,
        }
    }

    /// Stable machine-readable code for the root cause.
    pub fn code(&self) -> &'static str {
        match self.root_cause() {
            GenerationError::UnsupportedProvider(_) => "unsupported_provider",
            GenerationError::UnavailableProvider(_) => "unavailable_provider",
            GenerationError::NotImplemented(_) => "not_implemented",
            GenerationError::MalformedResponse { .. } => "malformed_response",
            GenerationError::ProviderCall { .. } => "provider_call",
            GenerationError::EmptyTopic => "empty_topic",
            GenerationError::Aggregate(_) => "aggregate",
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
