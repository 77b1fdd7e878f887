//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.google.max_labels == 0 {
            return Err(ConfigError::ValidationError(
                "google.max_labels must be > 0".into(),
            ));
        }
        if self.openai.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "openai.endpoint must not be empty".into(),
            ));
        }
        if self.google.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "google.endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }
}
