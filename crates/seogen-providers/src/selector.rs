//! The active-provider register.
//!
//! Exactly one provider is active at a time. Reads and switches go through
//! an `RwLock`, so a switch is atomic with respect to concurrent readers:
//! a reader sees either the old or the new provider, never a mix.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use seogen_core::{GenerationError, Result};

use crate::registry::{ProviderDescriptor, ProviderKind, ProviderRegistry};

/// Holds the registry and the currently active provider tag.
#[derive(Debug)]
pub struct ProviderSelector {
    registry: Arc<ProviderRegistry>,
    active: RwLock<ProviderKind>,
}

impl ProviderSelector {
    /// Create a selector with `default` active.
    ///
    /// The default is not required to have a credential; calls fail with
    /// `UnavailableProvider` until one is configured or another is selected.
    pub fn new(registry: Arc<ProviderRegistry>, default: ProviderKind) -> Self {
        Self {
            registry,
            active: RwLock::new(default),
        }
    }

    /// Create a selector from a configured tag such as `"GEMINI"`.
    pub fn from_tag(registry: Arc<ProviderRegistry>, tag: &str) -> Result<Self> {
        let kind: ProviderKind = tag.parse()?;
        Ok(Self::new(registry, kind))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Currently active tag.
    pub fn active_kind(&self) -> ProviderKind {
        *self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Descriptor of the active provider, checked for a credential.
    ///
    /// The returned value is a snapshot: a later switch does not affect it.
    pub fn get_active(&self) -> Result<ProviderDescriptor> {
        let descriptor = self.registry.get(self.active_kind());
        descriptor.require_credential()?;
        Ok(descriptor.clone())
    }

    /// Switch the active provider by tag (case-insensitive).
    ///
    /// On failure the active provider is left unchanged.
    pub fn set_active(&self, tag: &str) -> Result<String> {
        let upper = tag.trim().to_uppercase();
        let kind: ProviderKind = upper
            .parse()
            .map_err(|_| GenerationError::UnsupportedProvider(upper.clone()))?;

        let descriptor = self.registry.get(kind);
        if !descriptor.is_available() {
            return Err(GenerationError::UnavailableProvider(upper));
        }

        let previous = {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *active, kind)
        };

        info!(from = %previous, to = %kind, "active provider switched");
        Ok(format!("Switched to {} model.", kind.tag()))
    }

    /// Tags of all providers that have a credential.
    pub fn list_available(&self) -> Vec<ProviderKind> {
        self.registry.available().iter().map(|d| d.kind).collect()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use seogen_core::config::schema::ProvidersConfig;

    fn selector(gemini: &str, openai: &str, claude: &str) -> ProviderSelector {
        let mut config = ProvidersConfig::default();
        config.gemini.api_key = gemini.into();
        config.openai.api_key = openai.into();
        config.claude.api_key = claude.into();
        let registry = ProviderRegistry::from_config_with_env(&config, |_| None);
        ProviderSelector::new(Arc::new(registry), ProviderKind::Gemini)
    }

    #[test]
    fn test_switch_success() {
        let sel = selector("g", "o", "");
        let msg = sel.set_active("openai").unwrap();
        assert_eq!(msg, "Switched to OPENAI model.");
        assert_eq!(sel.active_kind(), ProviderKind::OpenAi);
        assert_eq!(sel.get_active().unwrap().display_name, "OpenAI");
    }

    #[test]
    fn test_switch_unknown_tag_keeps_state() {
        let sel = selector("g", "o", "");
        let err = sel.set_active("mistral").unwrap_err();
        assert_eq!(err.to_string(), "Model MISTRAL not supported.");
        assert_eq!(sel.active_kind(), ProviderKind::Gemini);
    }

    #[test]
    fn test_switch_without_credential_keeps_state() {
        let sel = selector("g", "", "");
        let err = sel.set_active("OpenAI").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Model OPENAI is not available. API key not configured."
        );
        assert_eq!(sel.active_kind(), ProviderKind::Gemini);
    }

    #[test]
    fn test_switch_to_claude_with_key() {
        let sel = selector("g", "", "c");
        assert_eq!(sel.set_active("claude").unwrap(), "Switched to CLAUDE model.");
        assert_eq!(sel.active_kind(), ProviderKind::Claude);
    }

    #[test]
    fn test_get_active_without_credential() {
        let sel = selector("", "o", "");
        let err = sel.get_active().unwrap_err();
        assert!(matches!(err, GenerationError::UnavailableProvider(ref t) if t == "GEMINI"));
    }

    #[test]
    fn test_from_tag() {
        let registry = Arc::new(ProviderRegistry::from_config_with_env(
            &ProvidersConfig::default(),
            |_| None,
        ));
        let sel = ProviderSelector::from_tag(registry.clone(), "openai").unwrap();
        assert_eq!(sel.active_kind(), ProviderKind::OpenAi);
        assert!(ProviderSelector::from_tag(registry, "llama").is_err());
    }

    #[test]
    fn test_list_available() {
        let sel = selector("g", "", "c");
        assert_eq!(
            sel.list_available(),
            vec![ProviderKind::Gemini, ProviderKind::Claude]
        );
    }
}
