use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted when the Gemini key is empty.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable consulted when the OpenAI key is empty.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Top-level configuration for photo-chain.
///
/// Controls which providers take part in the fallback chain, in what order,
/// and where the HTTP server listens. Image sizes and per-provider timeouts
/// are fixed and not configurable.
///
/// # Loading
///
/// ```rust,no_run
/// use photo_chain::config::Config;
///
/// // From a JSON file, with API keys filled from the environment
/// let mut config = Config::load(Some("config.json".as_ref())).unwrap();
/// config.apply_env();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.providers.gemini.api_key = "AIza...".into();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-provider settings.
    pub providers: Providers,
    /// Order in which providers are tried (fallback chain).
    pub provider_order: Vec<String>,
    /// HTTP server bind address.
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Providers {
    pub gemini: GeminiConfig,
    pub loremflickr: KeylessConfig,
    pub picsum: KeylessConfig,
    pub openai: OpenAiConfig,
}

/// Google Gemini image generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub enabled: bool,
}

/// OpenAI image generation (`gpt-image-1`, DALL·E).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub enabled: bool,
}

/// Providers that need no credential (LoremFlickr, Picsum).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeylessConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash-image".to_string(),
            enabled: true,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-image-1".to_string(),
            enabled: false,
        }
    }
}

impl Default for KeylessConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: Providers::default(),
            provider_order: vec![
                "gemini".to_string(),
                "loremflickr".to_string(),
                "picsum".to_string(),
                "openai".to_string(),
            ],
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Fill empty API keys from `GEMINI_API_KEY` / `OPENAI_API_KEY`.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Fill empty API keys using `lookup` as the environment.
    ///
    /// Keys already set in the file take precedence.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fill = |key: &mut String, var: &str| {
            if key.is_empty() {
                if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                    log::debug!("Using {var} from environment");
                    *key = value.trim().to_string();
                }
            }
        };
        fill(&mut self.providers.gemini.api_key, GEMINI_API_KEY_ENV);
        fill(&mut self.providers.openai.api_key, OPENAI_API_KEY_ENV);
    }

    /// Get the ordered list of enabled providers.
    ///
    /// Unknown names in `provider_order` are dropped with a warning.
    pub fn enabled_providers(&self) -> Vec<String> {
        self.provider_order
            .iter()
            .filter(|name| match name.as_str() {
                "gemini" => self.providers.gemini.enabled,
                "loremflickr" => self.providers.loremflickr.enabled,
                "picsum" => self.providers.picsum.enabled,
                "openai" => self.providers.openai.enabled,
                other => {
                    log::warn!("Unknown provider in provider_order: {other}");
                    false
                }
            })
            .cloned()
            .collect()
    }

    /// `host:port` for the HTTP server.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
