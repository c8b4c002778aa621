//! Daemon and model-profile configuration.
//!
//! Settings come from an optional TOML file (`--config`) overlaid with
//! environment variables; the environment always wins. The two model
//! profiles (`fast` and `smart`) share a base URL, API key, and HTTP
//! timeout and differ only in the default model name.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Default OpenAI-compatible endpoint (Ollama's local server).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434/v1";
/// Default API key accepted by Ollama.
pub const DEFAULT_API_KEY: &str = "ollama";
/// Default model HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 120;
/// Default model for the `fast` profile.
pub const DEFAULT_MODEL_FAST: &str = "deepseek-coder:6.7b";
/// Default model for the `smart` profile.
pub const DEFAULT_MODEL_SMART: &str = "deepseek-coder-v2:16b-lite-instruct-q4_K_M";
/// Default IPC socket name.
pub const DEFAULT_IPC_NAME: &str = "shellgeist";

/// Named model profile selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    /// Small, cheap model for low-stakes calls.
    Fast,
    /// Larger model used for edit generation.
    Smart,
}

impl ProfileKind {
    /// Wire name of the profile.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Smart => "smart",
        }
    }
}

/// Fully resolved connection settings for one model profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProfile {
    /// OpenAI-compatible base URL (no trailing slash).
    pub base_url: String,
    /// Bearer token sent with each request.
    pub api_key: String,
    /// Model name sent in the request body.
    pub model: String,
    /// Total request timeout.
    pub timeout: Duration,
}

/// Global configuration parsed from `config.toml` and the environment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Local socket name the daemon listens on.
    pub ipc_name: String,
    /// OpenAI-compatible base URL.
    pub base_url: String,
    /// API key for the model endpoint.
    pub api_key: String,
    /// Model HTTP timeout in seconds.
    pub http_timeout_seconds: u64,
    /// Model name for the `fast` profile.
    pub model_fast: String,
    /// Model name for the `smart` profile.
    pub model_smart: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ipc_name: DEFAULT_IPC_NAME.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: DEFAULT_API_KEY.to_owned(),
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            model_fast: DEFAULT_MODEL_FAST.to_owned(),
            model_smart: DEFAULT_MODEL_SMART.to_owned(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read, contains
    /// invalid TOML, or fails validation.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Build configuration purely from defaults and the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Resolved connection settings for the given profile.
    #[must_use]
    pub fn profile(&self, kind: ProfileKind) -> ModelProfile {
        let model = match kind {
            ProfileKind::Fast => self.model_fast.clone(),
            ProfileKind::Smart => self.model_smart.clone(),
        };
        ModelProfile {
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            api_key: self.api_key.clone(),
            model,
            timeout: Duration::from_secs(self.http_timeout_seconds),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_nonempty("OPENAI_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = env_nonempty("OPENAI_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = env_nonempty("SHELLGEIST_HTTP_TIMEOUT") {
            // A malformed value falls back to whatever was already set.
            if let Ok(seconds) = v.parse::<u64>() {
                self.http_timeout_seconds = seconds;
            }
        }
        if let Some(v) = env_nonempty("SHELLGEIST_MODEL_FAST") {
            self.model_fast = v;
        }
        if let Some(v) = env_nonempty("SHELLGEIST_MODEL_SMART") {
            self.model_smart = v;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.ipc_name.trim().is_empty() {
            return Err(AppError::Config("ipc_name must not be empty".into()));
        }
        if self.http_timeout_seconds == 0 {
            return Err(AppError::Config(
                "http_timeout_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
