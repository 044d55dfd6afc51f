//! Claude placeholder.
//!
//! Claude can be configured and selected, but every generation call fails
//! with `NotImplemented` until a messages-API client exists.

use async_trait::async_trait;

use seogen_core::{GenerationError, Result};

use crate::registry::{ProviderDescriptor, ProviderKind};
use crate::traits::TextProvider;

#[derive(Debug)]
pub struct ClaudeProvider {
    model: String,
    display_name: String,
}

impl ClaudeProvider {
    pub fn new(descriptor: &ProviderDescriptor) -> Result<Self> {
        descriptor.require_credential()?;
        Ok(Self {
            model: descriptor.model_id.clone(),
            display_name: descriptor.display_name.clone(),
        })
    }
}

#[async_trait]
impl TextProvider for ClaudeProvider {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(GenerationError::NotImplemented(self.display_name.clone()))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn model(&self) -> &str {
        &self.model
    }
}
