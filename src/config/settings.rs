//! Application settings structs, defaults and TOML persistence.
//!
//! Settings are read once at process start.  Every field has a default, so a
//! partial `settings.toml` (or none at all) is valid.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable consulted for the API credential when the settings
/// file does not carry one.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the LLM judge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API, without the `/v1/...` suffix.
    pub base_url: String,
    /// API credential.  When `None` (or empty) the judge skips the network
    /// call and returns its fallback verdict.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature.  Kept low so labels are reproducible.
    pub temperature: f32,
    /// Upper bound on completion length.
    pub max_tokens: u32,
    /// Maximum seconds to wait for a completion before timing out.
    pub timeout_secs: u64,
    /// Document text longer than this many characters is truncated before it
    /// is embedded in the prompt.
    pub max_document_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4".into(),
            temperature: 0.1,
            max_tokens: 1000,
            timeout_secs: 30,
            max_document_chars: 8_000,
        }
    }
}

impl LlmConfig {
    /// The configured key, if it is present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```toml
/// log_level = "info"
///
/// [llm]
/// base_url = "https://api.openai.com"
/// model = "gpt-4"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default `env_logger` filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
    /// LLM judge settings.
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::settings_path(None))
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Fill `llm.api_key` from [`API_KEY_ENV`] when the file left it unset.
    pub fn apply_env(&mut self) {
        self.apply_api_key_fallback(std::env::var(API_KEY_ENV).ok());
    }

    fn apply_api_key_fallback(&mut self, from_env: Option<String>) {
        if self.llm.api_key().is_none() {
            if let Some(key) = from_env.filter(|k| !k.trim().is_empty()) {
                self.llm.api_key = Some(key);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
