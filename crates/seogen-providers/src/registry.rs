//! Provider registry: static specs for the supported LLM providers.
//!
//! Each `ProviderSpec` describes how to reach a provider: its tag, env var,
//! default model, and API base. At startup the specs are combined with the
//! loaded config into one immutable [`ProviderDescriptor`] per provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use seogen_core::config::schema::ProvidersConfig;
use seogen_core::GenerationError;

// ─────────────────────────────────────────────
// ProviderKind: the enumerated tag
// ─────────────────────────────────────────────

/// Supported provider tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Claude,
}

impl ProviderKind {
    /// Canonical uppercase tag (`"GEMINI"`, `"OPENAI"`, `"CLAUDE"`).
    pub fn tag(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI",
            ProviderKind::OpenAi => "OPENAI",
            ProviderKind::Claude => "CLAUDE",
        }
    }

    /// Static spec for this kind.
    pub fn spec(&self) -> &'static ProviderSpec {
        match self {
            ProviderKind::Gemini => &PROVIDERS[0],
            ProviderKind::OpenAi => &PROVIDERS[1],
            ProviderKind::Claude => &PROVIDERS[2],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ProviderKind {
    type Err = GenerationError;

    /// Case-insensitive: `"gemini"`, `"Gemini"` and `"GEMINI"` all match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        PROVIDERS
            .iter()
            .find(|spec| spec.kind.tag() == upper)
            .map(|spec| spec.kind)
            .ok_or_else(|| GenerationError::UnsupportedProvider(s.to_string()))
    }
}

// ─────────────────────────────────────────────
// ProviderSpec: static metadata for one provider
// ─────────────────────────────────────────────

/// Static description of one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Config section name (e.g. `"gemini"`).
    pub name: &'static str,
    /// Human-readable name for logs and messages.
    pub display_name: &'static str,
    /// Conventional environment variable holding the API key.
    pub env_key: &'static str,
    /// Model used when the config does not name one.
    pub default_model: &'static str,
    /// API base used when the config does not override it.
    pub default_api_base: &'static str,
}

/// Complete list of supported providers.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::Gemini,
        name: "gemini",
        display_name: "Gemini",
        env_key: "GEMINI_API_KEY",
        default_model: "gemini-2.0-flash-exp",
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
    },
    ProviderSpec {
        kind: ProviderKind::OpenAi,
        name: "openai",
        display_name: "OpenAI",
        env_key: "OPENAI_API_KEY",
        default_model: "gpt-4o-mini",
        default_api_base: "https://api.openai.com/v1",
    },
    ProviderSpec {
        kind: ProviderKind::Claude,
        name: "claude",
        display_name: "Claude",
        env_key: "CLAUDE_API_KEY",
        default_model: "claude-3-5-sonnet-latest",
        default_api_base: "https://api.anthropic.com/v1",
    },
];

/// Find a provider spec by config name (`"openai"`).
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

// ─────────────────────────────────────────────
// ProviderDescriptor: resolved at startup
// ─────────────────────────────────────────────

/// A provider as resolved from config: tag, credential, model.
///
/// Immutable once built. `Debug` never prints the credential.
#[derive(Clone, PartialEq)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub display_name: String,
    pub credential: Option<String>,
    pub model_id: String,
    pub api_base: String,
}

impl ProviderDescriptor {
    /// Whether a credential is configured.
    pub fn is_available(&self) -> bool {
        self.credential.is_some()
    }

    /// The credential, or `UnavailableProvider` if none is configured.
    pub fn require_credential(&self) -> Result<&str, GenerationError> {
        self.credential
            .as_deref()
            .ok_or_else(|| GenerationError::UnavailableProvider(self.kind.tag().to_string()))
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("kind", &self.kind)
            .field("display_name", &self.display_name)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("model_id", &self.model_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

// ─────────────────────────────────────────────
// ProviderRegistry
// ─────────────────────────────────────────────

/// Exactly one descriptor per supported provider, loaded once.
#[derive(Clone, Debug)]
pub struct ProviderRegistry {
    descriptors: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Build from config, falling back to each provider's conventional env
    /// var (e.g. `GEMINI_API_KEY`) when the config key is empty.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self::from_config_with_env(config, |key| std::env::var(key).ok())
    }

    /// Like [`from_config`](Self::from_config) with an explicit env lookup.
    pub fn from_config_with_env(
        config: &ProvidersConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let descriptors = PROVIDERS
            .iter()
            .map(|spec| {
                let provider = config.get_by_name(spec.name).cloned().unwrap_or_default();
                let credential = if provider.is_configured() {
                    Some(provider.api_key.trim().to_string())
                } else {
                    env(spec.env_key)
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                };
                ProviderDescriptor {
                    kind: spec.kind,
                    display_name: spec.display_name.to_string(),
                    credential,
                    model_id: provider
                        .model
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| spec.default_model.to_string()),
                    api_base: provider
                        .api_base
                        .unwrap_or_else(|| spec.default_api_base.to_string()),
                }
            })
            .collect();

        Self { descriptors }
    }

    /// Look up the descriptor for a kind.
    pub fn get(&self, kind: ProviderKind) -> &ProviderDescriptor {
        // One descriptor per spec, built in PROVIDERS order.
        &self.descriptors[kind_index(kind)]
    }

    /// All descriptors, in registry order.
    pub fn all(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }

    /// Descriptors with a configured credential.
    pub fn available(&self) -> Vec<&ProviderDescriptor> {
        self.descriptors.iter().filter(|d| d.is_available()).collect()
    }
}

fn kind_index(kind: ProviderKind) -> usize {
    match kind {
        ProviderKind::Gemini => 0,
        ProviderKind::OpenAi => 1,
        ProviderKind::Claude => 2,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn config_with_keys(gemini: &str, openai: &str) -> ProvidersConfig {
        let mut config = ProvidersConfig::default();
        config.gemini.api_key = gemini.to_string();
        config.openai.api_key = openai.to_string();
        config
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("GEMINI".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" claude ".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "mistral".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedProvider(ref t) if t == "mistral"));
    }

    #[test]
    fn test_kind_spec_round_trip() {
        for spec in PROVIDERS {
            assert_eq!(spec.kind.spec().name, spec.name);
            assert_eq!(find_by_name(spec.name).unwrap().kind, spec.kind);
        }
    }

    #[test]
    fn test_all_providers_have_unique_tags() {
        let mut tags: Vec<&str> = PROVIDERS.iter().map(|s| s.kind.tag()).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), PROVIDERS.len());
    }

    #[test]
    fn test_registry_one_descriptor_per_kind() {
        let registry = ProviderRegistry::from_config_with_env(&ProvidersConfig::default(), no_env);
        assert_eq!(registry.all().len(), 3);
        for spec in PROVIDERS {
            assert_eq!(registry.get(spec.kind).kind, spec.kind);
        }
    }

    #[test]
    fn test_registry_defaults_model_and_base() {
        let registry = ProviderRegistry::from_config_with_env(&ProvidersConfig::default(), no_env);
        let gemini = registry.get(ProviderKind::Gemini);
        assert_eq!(gemini.model_id, "gemini-2.0-flash-exp");
        assert_eq!(gemini.display_name, "Gemini");
        assert!(gemini.api_base.contains("generativelanguage"));
        assert!(!gemini.is_available());
    }

    #[test]
    fn test_registry_config_overrides() {
        let mut config = config_with_keys("", "sk-123");
        config.openai.model = Some("gpt-4o".into());
        config.openai.api_base = Some("http://localhost:1234/v1".into());

        let registry = ProviderRegistry::from_config_with_env(&config, no_env);
        let openai = registry.get(ProviderKind::OpenAi);
        assert_eq!(openai.credential.as_deref(), Some("sk-123"));
        assert_eq!(openai.model_id, "gpt-4o");
        assert_eq!(openai.api_base, "http://localhost:1234/v1");
    }

    #[test]
    fn test_registry_env_fallback() {
        let registry = ProviderRegistry::from_config_with_env(
            &ProvidersConfig::default(),
            |key| (key == "GEMINI_API_KEY").then(|| "g-from-env".to_string()),
        );
        assert_eq!(
            registry.get(ProviderKind::Gemini).credential.as_deref(),
            Some("g-from-env")
        );
        assert!(!registry.get(ProviderKind::OpenAi).is_available());
    }

    #[test]
    fn test_registry_config_key_beats_env() {
        let registry = ProviderRegistry::from_config_with_env(
            &config_with_keys("g-config", ""),
            |_| Some("from-env".to_string()),
        );
        assert_eq!(
            registry.get(ProviderKind::Gemini).credential.as_deref(),
            Some("g-config")
        );
    }

    #[test]
    fn test_available_filters_missing_credentials() {
        let registry =
            ProviderRegistry::from_config_with_env(&config_with_keys("g", "o"), no_env);
        let available: Vec<ProviderKind> = registry.available().iter().map(|d| d.kind).collect();
        assert_eq!(available, vec![ProviderKind::Gemini, ProviderKind::OpenAi]);
    }

    #[test]
    fn test_require_credential() {
        let registry = ProviderRegistry::from_config_with_env(&config_with_keys("g", ""), no_env);
        assert_eq!(registry.get(ProviderKind::Gemini).require_credential().unwrap(), "g");
        let err = registry.get(ProviderKind::OpenAi).require_credential().unwrap_err();
        assert!(matches!(err, GenerationError::UnavailableProvider(ref t) if t == "OPENAI"));
    }

    #[test]
    fn test_descriptor_debug_redacts_credential() {
        let registry =
            ProviderRegistry::from_config_with_env(&config_with_keys("g-secret", ""), no_env);
        let debug = format!("{:?}", registry.get(ProviderKind::Gemini));
        assert!(!debug.contains("g-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
