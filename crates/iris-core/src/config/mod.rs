//! Configuration management for Iris.
//!
//! Configuration is loaded from `~/.iris/config.toml` (or the platform config
//! directory) with sensible defaults. All config structs implement `Default`.

mod types;
mod update;
mod validate;

pub use types::*;
pub use update::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Iris.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Active analysis backend
    pub mode: Mode,

    /// Behavior when the active backend fails
    pub fallback: FallbackPolicy,

    /// OpenAI Vision settings
    pub openai: OpenAiConfig,

    /// Google Cloud Vision settings
    pub google: GoogleConfig,

    /// Local model settings
    pub local: LocalConfig,

    /// Result cache policy
    pub cache: CacheConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.iris.iris/config.toml
    /// - Linux: ~/.config/iris/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\iris\config\config.toml
    ///
    /// Falls back to ~/.iris/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "iris", "iris")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = shellexpand::tilde("~").into_owned();
                PathBuf::from(home).join(".iris").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.mode, Mode::Mock);
        assert_eq!(config.fallback, FallbackPolicy::Mock);
        assert!(config.cache.enabled);
        assert_eq!(config.limits.timeout_ms, 30_000);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("mode = \"mock\""));
        assert!(toml.contains("[openai]"));
        assert!(toml.contains("[cache]"));
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "mode = \"google\"\n\n[google]\napi_key = \"g-key\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.mode, Mode::Google);
        assert_eq!(config.google.api_key, "g-key");
        assert_eq!(config.google.max_labels, 10);
        assert_eq!(config.openai, OpenAiConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.mode = Mode::OpenAi;
        config.openai.model = "gpt-4o".to_string();
        config.cache.ttl_secs = 60;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\ntimeout_ms = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_from_toml_str() {
        let config = Config::from_toml_str("mode = \"local\"\n").unwrap();
        assert_eq!(config.mode, Mode::Local);

        assert!(matches!(
            Config::from_toml_str("openai = 5\n"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[google]\nmax_labels = 0\n"),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
