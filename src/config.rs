use serde::Deserialize;
use std::path::Path;

use crate::ai::DEFAULT_MODEL;

/// Application configuration. Every field has a default, so an absent config
/// file is fine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) ai: AiConfig,
    pub(crate) logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct AiConfig {
    pub(crate) api_key: Option<String>,
    pub(crate) model: String,
    /// Overrides the Gemini endpoint, e.g. for a proxy.
    pub(crate) base_url: Option<String>,
    pub(crate) timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct LoggingConfig {
    pub(crate) level: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            timeout_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// `<config_dir>/config.toml`, then `SNAPLEDGER_*` environment variables
    /// (`SNAPLEDGER_AI__API_KEY`), then `GEMINI_API_KEY` if no key was set.
    pub(crate) fn load(config_dir: &Path) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(config_dir.join("config.toml")).required(false))
            .add_source(
                config::Environment::with_prefix("SNAPLEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        Ok(loaded.with_key_fallback(std::env::var("GEMINI_API_KEY").ok()))
    }

    fn with_key_fallback(mut self, fallback: Option<String>) -> Self {
        let has_key = self
            .ai
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if !has_key {
            self.ai.api_key = fallback.filter(|k| !k.trim().is_empty());
        }
        self
    }
}
