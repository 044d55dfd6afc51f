//! Config loader: reads `~/.seogen/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.seogen/config.json`
//! 3. Environment variables `SEOGEN_<SECTION>__<FIELD>` (override JSON)
//!
//! Provider-conventional variables such as `GEMINI_API_KEY` are consulted
//! later, by the provider registry, only when no key is configured here.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::data_dir().join("config.json")
}

/// Load configuration from the given path (or the default one) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `SEOGEN_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `SEOGEN_PROVIDERS__<NAME>__API_KEY` / `__API_BASE` / `__MODEL`
/// - `SEOGEN_GENERATOR__DEFAULT_PROVIDER`
/// - `SEOGEN_GENERATOR__MAX_TOKENS`
/// - `SEOGEN_GENERATOR__TEMPERATURE`
/// - `SEOGEN_GENERATOR__REQUEST_TIMEOUT_SECS`
/// - `SEOGEN_SERVER__HOST` / `SEOGEN_SERVER__PORT`
/// - `SEOGEN_HISTORY__ENABLED` / `SEOGEN_HISTORY__PATH`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    for name in ["gemini", "openai", "claude"] {
        let upper = name.to_uppercase();
        if let Some(provider) = config.providers.get_by_name_mut(name) {
            if let Some(val) = var(&format!("SEOGEN_PROVIDERS__{upper}__API_KEY")) {
                provider.api_key = val;
            }
            if let Some(val) = var(&format!("SEOGEN_PROVIDERS__{upper}__API_BASE")) {
                provider.api_base = Some(val);
            }
            if let Some(val) = var(&format!("SEOGEN_PROVIDERS__{upper}__MODEL")) {
                provider.model = Some(val);
            }
        }
    }

    // Generator
    if let Some(val) = var("SEOGEN_GENERATOR__DEFAULT_PROVIDER") {
        config.generator.default_provider = val;
    }
    if let Some(n) = var("SEOGEN_GENERATOR__MAX_TOKENS").and_then(|v| v.parse().ok()) {
        config.generator.max_tokens = n;
    }
    if let Some(t) = var("SEOGEN_GENERATOR__TEMPERATURE").and_then(|v| v.parse().ok()) {
        config.generator.temperature = t;
    }
    if let Some(s) = var("SEOGEN_GENERATOR__REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.generator.request_timeout_secs = s;
    }

    // Server
    if let Some(val) = var("SEOGEN_SERVER__HOST") {
        config.server.host = val;
    }
    if let Some(p) = var("SEOGEN_SERVER__PORT").and_then(|v| v.parse().ok()) {
        config.server.port = p;
    }

    // History
    if let Some(val) = var("SEOGEN_HISTORY__ENABLED") {
        config.history.enabled = val == "true" || val == "1";
    }
    if let Some(val) = var("SEOGEN_HISTORY__PATH") {
        config.history.path = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
