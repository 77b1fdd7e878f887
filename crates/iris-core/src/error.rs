//! Error types for Iris image analysis.
//!
//! Backend failures (`Configuration`, `Backend`, `Timeout`) are subject to the
//! analyzer's fallback policy. `Input` errors always reach the caller.

use crate::config::Mode;
use thiserror::Error;

/// Top-level error type for Iris operations.
#[derive(Error, Debug)]
pub enum IrisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Analysis errors that were not absorbed by the fallback policy
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while analyzing a single image.
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    /// The selected backend is missing a required credential or setting
    #[error("{provider} backend is not configured: {message}")]
    Configuration { provider: Mode, message: String },

    /// The backend call failed: network error, non-2xx status, malformed body
    #[error("{provider} backend error: {message}")]
    Backend {
        provider: Mode,
        message: String,
        status_code: Option<u16>,
    },

    /// The backend call exceeded the configured timeout
    #[error("{provider} backend timed out after {timeout_ms}ms")]
    Timeout { provider: Mode, timeout_ms: u64 },

    /// The image reference could not be read
    #[error("Cannot read image {image}: {message}")]
    Input { image: String, message: String },
}

impl AnalysisError {
    /// Whether this error comes from the backend side and may be replaced
    /// by a mock result.
    pub fn is_backend_failure(&self) -> bool {
        !matches!(self, AnalysisError::Input { .. })
    }

    /// The backend this error is attributed to, if any.
    pub fn provider(&self) -> Option<Mode> {
        match self {
            AnalysisError::Configuration { provider, .. }
            | AnalysisError::Backend { provider, .. }
            | AnalysisError::Timeout { provider, .. } => Some(*provider),
            AnalysisError::Input { .. } => None,
        }
    }
}

/// Convenience type alias for Iris results.
pub type Result<T> = std::result::Result<T, IrisError>;

/// Convenience type alias for backend call results.
pub type BackendResult<T> = std::result::Result<T, AnalysisError>;
