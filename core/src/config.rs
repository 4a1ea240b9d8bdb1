use crate::errors::{KisanError, KisanResult};
use crate::prompts::KISAN_MITRA_INSTRUCTION;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REGION_CONTEXT: &str = "India";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the Gemini-backed assistant
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KisanConfig {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub api_base_url: Option<String>,
    pub system_instruction: Option<String>,
    pub region_context: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for KisanConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: Some(DEFAULT_MODEL.to_string()),
            api_base_url: Some(DEFAULT_API_BASE_URL.to_string()),
            system_instruction: Some(KISAN_MITRA_INSTRUCTION.to_string()),
            region_context: Some(DEFAULT_REGION_CONTEXT.to_string()),
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl KisanConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> KisanResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            KisanError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            KisanError::Configuration(format!("Failed to parse config file: {}", e))
        })?;

        // Keys absent from the file keep their defaults
        Ok(Self::default().merge(&config))
    }

    /// Overlay built from environment variables.
    ///
    /// `API_KEY` wins over `GEMINI_API_KEY`; `KISAN_MODEL` selects the model.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            api_key: non_empty("API_KEY").or_else(|| non_empty("GEMINI_API_KEY")),
            model_name: non_empty("KISAN_MODEL"),
            api_base_url: None,
            system_instruction: None,
            region_context: None,
            request_timeout_secs: None,
        }
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            model_name: other.model_name.clone().or_else(|| self.model_name.clone()),
            api_base_url: other
                .api_base_url
                .clone()
                .or_else(|| self.api_base_url.clone()),
            system_instruction: other
                .system_instruction
                .clone()
                .or_else(|| self.system_instruction.clone()),
            region_context: other
                .region_context
                .clone()
                .or_else(|| self.region_context.clone()),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
        }
    }

    /// The API key, or a fatal configuration error if none was supplied.
    pub fn require_api_key(&self) -> KisanResult<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                KisanError::Configuration(
                    "API_KEY environment variable not set".to_string(),
                )
            })
    }

    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn system_instruction(&self) -> &str {
        self.system_instruction
            .as_deref()
            .unwrap_or(KISAN_MITRA_INSTRUCTION)
    }

    pub fn region_context(&self) -> &str {
        self.region_context
            .as_deref()
            .unwrap_or(DEFAULT_REGION_CONTEXT)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> KisanResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        KisanError::Configuration("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name).join("config.toml"))
}
