use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::YtmetaError;

/// Environment variable that overrides the stored API key
pub const API_KEY_ENV: &str = "PERPLEXITY_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content generation API settings
    pub api: ApiConfig,

    /// Whisper transcription settings
    pub transcription: TranscriptionConfig,

    /// Export settings
    pub export: ExportConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Perplexity API key (the environment variable takes precedence)
    pub perplexity_api_key: String,

    /// Chat completions endpoint
    pub api_url: String,

    /// Model used for every content kind
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Whisper CLI executable
    pub whisper_command: String,

    /// Model size: tiny, base, small, medium, large
    pub model_size: String,

    /// Language code (auto-detect if not specified)
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Export every successful result once a batch completes
    pub auto_export: bool,

    /// Directory for exported files
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Temporary directory for extracted audio
    pub temp_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            perplexity_api_key: String::new(),
            api_url: "https://api.perplexity.ai/chat/completions".to_string(),
            model: "llama-3-sonar-large-32k-online".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            whisper_command: "whisper".to_string(),
            model_size: "tiny".to_string(),
            language: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            auto_export: false,
            output_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path, writing defaults if it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs_err::read_to_string(config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("ytmeta.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("ytmeta").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.api.api_url)
            .map_err(|_| YtmetaError::Config(format!("Invalid API URL: {}", self.api.api_url)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(YtmetaError::Config("API URL must use HTTP or HTTPS protocol".to_string()).into());
        }

        if self.transcription.whisper_command.trim().is_empty() {
            return Err(YtmetaError::Config("Whisper command must not be empty".to_string()).into());
        }

        Ok(())
    }

    /// API key, checking the environment before the config file
    pub fn api_key(&self) -> Option<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .filter(|key| !key.is_empty())
            .or_else(|| Some(self.api.perplexity_api_key.clone()))
            .filter(|key| !key.is_empty())
    }

    /// Store a new API key and persist the configuration
    pub async fn set_api_key(&mut self, api_key: &str) -> Result<()> {
        self.api.perplexity_api_key = api_key.trim().to_string();
        self.save().await
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        match self.api_key() {
            Some(key) => println!("  API Key: {} ✓", crate::utils::mask_secret(&key)),
            None => println!("  API Key: not set ✗"),
        }
        println!("  API URL: {}", self.api.api_url);
        println!("  Model: {}", self.api.model);
        println!("  Whisper: {} (model: {})", self.transcription.whisper_command, self.transcription.model_size);
        if let Some(language) = &self.transcription.language {
            println!("  Language: {}", language);
        }
        println!("  Auto Export: {}", self.export.auto_export);
        if let Some(dir) = &self.export.output_dir {
            println!("  Export Directory: {}", dir.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_ok!(config.validate());
        assert_eq!(config.transcription.model_size, "tiny");
        assert!(!config.export.auto_export);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let yaml = "api:\n  perplexity_api_key: pplx-abc\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.perplexity_api_key, "pplx-abc");
        assert_eq!(config.api.api_url, "https://api.perplexity.ai/chat/completions");
        assert!(config.export.output_dir.is_none());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert!(config.api.perplexity_api_key.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.api.perplexity_api_key = "pplx-saved".to_string();
        config.export.auto_export = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.perplexity_api_key, "pplx-saved");
        assert!(loaded.export.auto_export);
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let mut config = Config::default();
        config.api.api_url = "ftp://example.com".to_string();
        assert_err!(config.validate());

        config.api.api_url = "not a url".to_string();
        assert_err!(config.validate());
    }

    #[test]
    fn test_env_key_takes_precedence() {
        let mut config = Config::default();
        config.api.perplexity_api_key = "from-file".to_string();

        assert_eq!(config.resolve_api_key(Some("from-env".to_string())).as_deref(), Some("from-env"));
        assert_eq!(config.resolve_api_key(Some(String::new())).as_deref(), Some("from-file"));
        assert_eq!(config.resolve_api_key(None).as_deref(), Some("from-file"));

        config.api.perplexity_api_key.clear();
        assert_eq!(config.resolve_api_key(None), None);
    }
}
