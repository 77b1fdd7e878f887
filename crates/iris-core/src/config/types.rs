//! Sub-configuration structs and the backend mode enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Analysis backend selected by the `mode` setting.
///
/// Unknown strings deserialize to [`Mode::Mock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    /// Synthetic results, no network
    #[default]
    Mock,
    /// OpenAI vision chat completions
    OpenAi,
    /// Google Cloud Vision annotate
    Google,
    /// Local model placeholder (currently served by the mock generator)
    Local,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Mock => "mock",
            Mode::OpenAi => "openai",
            Mode::Google => "google",
            Mode::Local => "local",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Mode {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "mock" => Mode::Mock,
            "openai" => Mode::OpenAi,
            "google" => Mode::Google,
            "local" => Mode::Local,
            other => {
                tracing::warn!("Unknown analysis mode '{other}', using mock");
                Mode::Mock
            }
        }
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

/// What to do when the selected backend fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Substitute a mock result marked `degraded`
    #[default]
    Mock,
    /// Return the backend error to the caller
    Surface,
}

/// OpenAI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,

    /// API base URL; chat completions and model listing hang off it
    pub endpoint: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Google Cloud Vision configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Project billed for the request; sent as `x-goog-user-project` when set
    pub project_id: String,

    /// API base URL
    pub endpoint: String,

    /// Maximum labels requested from label detection
    pub max_labels: u32,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: "${GOOGLE_VISION_API_KEY}".to_string(),
            project_id: String::new(),
            endpoint: "https://vision.googleapis.com/v1".to_string(),
            max_labels: 10,
        }
    }
}

/// Local model settings. Not executed yet; the mock generator answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Model name
    pub model: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            model: "llava".to_string(),
        }
    }
}

/// Result cache policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether results are memoized by request fingerprint
    pub enabled: bool,

    /// Entry lifetime in seconds; 0 keeps entries until the cache is cleared
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
        }
    }
}

impl CacheConfig {
    /// Entry lifetime, or `None` when expiry is disabled.
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }
}

/// Resource limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Backend call timeout in milliseconds
    pub timeout_ms: u64,

    /// Maximum input size in megabytes
    pub max_file_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_file_size_mb: 20,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parses_known_values() {
        assert_eq!(Mode::from("openai".to_string()), Mode::OpenAi);
        assert_eq!(Mode::from("Google".to_string()), Mode::Google);
        assert_eq!(Mode::from("local".to_string()), Mode::Local);
    }

    #[test]
    fn test_unknown_mode_falls_back_to_mock() {
        assert_eq!(Mode::from("azure".to_string()), Mode::Mock);
        let mode: Mode = serde_json::from_str("\"claude\"").unwrap();
        assert_eq!(mode, Mode::Mock);
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::OpenAi).unwrap(), "\"openai\"");
    }

    #[test]
    fn test_cache_ttl_zero_disables_expiry() {
        let config = CacheConfig {
            enabled: true,
            ttl_secs: 0,
        };
        assert!(config.ttl().is_none());
        assert_eq!(
            CacheConfig::default().ttl(),
            Some(Duration::from_secs(3600))
        );
    }
}
