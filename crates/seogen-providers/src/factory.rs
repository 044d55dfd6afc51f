//! Builds a [`TextProvider`] for a resolved descriptor.
//!
//! The generator depends on [`ProviderFactory`] rather than on the concrete
//! clients, so tests can substitute scripted providers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use seogen_core::Result;

use crate::claude::ClaudeProvider;
use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;
use crate::registry::{ProviderDescriptor, ProviderKind};
use crate::traits::{RequestConfig, TextProvider};

/// Creates provider clients on demand.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, descriptor: &ProviderDescriptor) -> Result<Arc<dyn TextProvider>>;
}

/// Factory for the real HTTP clients.
///
/// All clients share one `reqwest::Client` (one connection pool), and each
/// provider kind is built once and then reused. Descriptors are immutable
/// after the registry loads, so a cached client never goes stale.
pub struct HttpProviderFactory {
    request_config: RequestConfig,
    http: reqwest::Client,
    built: Mutex<HashMap<ProviderKind, Arc<dyn TextProvider>>>,
}

impl std::fmt::Debug for HttpProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let built: Vec<ProviderKind> = self
            .built
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        f.debug_struct("HttpProviderFactory")
            .field("request_config", &self.request_config)
            .field("built", &built)
            .finish()
    }
}

impl Default for HttpProviderFactory {
    fn default() -> Self {
        Self::new(RequestConfig::default())
    }
}

impl HttpProviderFactory {
    pub fn new(request_config: RequestConfig) -> Self {
        Self {
            request_config,
            http: reqwest::Client::new(),
            built: Mutex::new(HashMap::new()),
        }
    }

    fn build(&self, descriptor: &ProviderDescriptor) -> Result<Arc<dyn TextProvider>> {
        debug!(
            provider = %descriptor.display_name,
            model = %descriptor.model_id,
            api_base = %descriptor.api_base,
            "creating provider client"
        );

        let http = self.http.clone();
        let config = self.request_config.clone();
        let provider: Arc<dyn TextProvider> = match descriptor.kind {
            ProviderKind::Gemini => Arc::new(GeminiProvider::with_client(http, descriptor, config)?),
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::with_client(http, descriptor, config)?),
            ProviderKind::Claude => Arc::new(ClaudeProvider::new(descriptor)?),
        };
        Ok(provider)
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn create(&self, descriptor: &ProviderDescriptor) -> Result<Arc<dyn TextProvider>> {
        let mut built = self.built.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(provider) = built.get(&descriptor.kind) {
            return Ok(provider.clone());
        }

        let provider = self.build(descriptor)?;
        built.insert(descriptor.kind, provider.clone());
        Ok(provider)
    }
}
