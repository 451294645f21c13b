//! Settings for the `wordgrid` binary.
//!
//! One TOML file carries both halves: the session keys (`preamble`,
//! `word_separator`, `offsets`) sit at the top level next to the model
//! endpoint, sampling knobs and submit URL. The bearer token stays out of the
//! file; `api_key_env` only names the variable to read it from.
//!
//! ```rust
//! use wordgrid::ClientConfig;
//! use wordgrid_core::SessionController;
//!
//! let config = ClientConfig::default();
//! let session = SessionController::new(&config.session).unwrap();
//! assert!(session.lattice().is_empty());
//! ```
use serde::{Deserialize, Serialize};
use wordgrid_core::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://api.fireworks.ai/inference/v1/chat/completions";
pub const DEFAULT_MODEL: &str =
    "accounts/dongyoon-kang-a70308/deployedModels/ft-avart-garde-v2-prompt-yytv2pwt";
pub const DEFAULT_API_KEY_ENV: &str = "FIREWORKS_API_KEY";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Session keys, flattened to the top level of the file
    #[serde(flatten)]
    pub session: wordgrid_core::Config,

    /// Chat-completions URL
    pub endpoint: String,
    /// Deployed model identifier
    pub model: String,

    // Sampling parameters forwarded as-is
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,

    /// Request timeout for both suggestion and submit calls
    pub timeout_ms: u64,

    /// Environment variable holding the bearer token
    pub api_key_env: String,

    /// Where finished grids are POSTed; no submission when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            session: wordgrid_core::Config::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            // One word is all we keep from each choice
            max_tokens: 8,
            temperature: 0.6,
            top_p: 1.0,
            top_k: 40,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            timeout_ms: 10_000,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            submit_url: None,
        }
    }
}

impl ClientConfig {
    /// Load and validate a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate()?;
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint is empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model is empty".into()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be positive".into()));
        }
        Ok(())
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
