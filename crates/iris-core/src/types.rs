//! Core data types for Iris image analysis.
//!
//! Every backend produces a [`NormalizedAnalysis`], whatever its native
//! response looks like. The analyzer wraps it in an [`AnalysisResult`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Mode;
use crate::error::AnalysisError;

/// The image to analyze: a file on disk or bytes already in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Short human-readable label for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

/// OpenAI image detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    #[default]
    Auto,
    Low,
    High,
}

/// What the caller is mostly interested in; shapes the default prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    #[default]
    General,
    Objects,
    Text,
    Colors,
    Sentiment,
}

/// Per-request options. Part of the cache fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Custom prompt; overrides the prompt derived from `analysis_type`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Completion token budget (OpenAI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Image detail level (OpenAI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,

    /// Focus of the analysis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<AnalysisKind>,
}

/// Overall tone of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

/// Basic image properties, read locally from the bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Width in pixels (0 when the header could not be read)
    pub width: u32,

    /// Height in pixels (0 when the header could not be read)
    pub height: u32,

    /// Format identifier ("jpeg", "png", ...)
    pub format: String,

    /// Size of the image in bytes
    pub size_bytes: u64,
}

/// A label with its detection score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLabel {
    pub name: String,
    pub score: f32,
}

/// A dominant colour with its score and share of the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteColor {
    /// "rgb(r, g, b)"
    pub color: String,
    pub score: f32,
    pub pixel_fraction: f32,
}

/// Emotion likelihoods for one detected face ("VERY_LIKELY" ... "VERY_UNLIKELY").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceEmotions {
    pub joy: String,
    pub sorrow: String,
    pub anger: String,
    pub surprise: String,
}

/// The provider-independent analysis shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAnalysis {
    /// Detected objects, most relevant first
    pub objects: Vec<String>,

    /// Colours as "#rrggbb" or "rgb(r, g, b)"
    pub colors: Vec<String>,

    pub sentiment: Sentiment,

    /// Confidence from 0.0 to 1.0
    pub confidence: f32,

    /// Free-text description or recognized text
    pub text: String,

    pub metadata: ImageMetadata,

    // === Provider details (Google) ===
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<ScoredLabel>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<PaletteColor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<FaceEmotions>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logos: Vec<String>,

    /// Safe-search block exactly as the provider returned it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_search: Option<serde_json::Value>,
}

impl NormalizedAnalysis {
    /// An analysis with only the common fields filled in.
    pub fn new(
        objects: Vec<String>,
        colors: Vec<String>,
        sentiment: Sentiment,
        confidence: f32,
        text: impl Into<String>,
        metadata: ImageMetadata,
    ) -> Self {
        Self {
            objects,
            colors,
            sentiment,
            confidence,
            text: text.into(),
            metadata,
            labels: Vec::new(),
            palette: Vec::new(),
            faces: Vec::new(),
            logos: Vec::new(),
            safe_search: None,
        }
    }
}

/// What `analyze_image` hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,

    /// Backend that produced `analysis`
    pub mode: Mode,

    pub timestamp: DateTime<Utc>,

    pub analysis: NormalizedAnalysis,

    pub processing_time_ms: u64,

    /// Failure message when the result is a fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// True when `analysis` is a mock substitute for a failed backend
    pub degraded: bool,

    /// Mode that was asked for; differs from `mode` when degraded
    pub requested_mode: Mode,
}

impl AnalysisResult {
    /// A result produced by the requested backend.
    pub fn completed(mode: Mode, analysis: NormalizedAnalysis, elapsed: Duration) -> Self {
        Self {
            success: true,
            mode,
            timestamp: Utc::now(),
            analysis,
            processing_time_ms: elapsed.as_millis() as u64,
            error: None,
            degraded: false,
            requested_mode: mode,
        }
    }

    /// A mock result standing in for a failed `requested` backend.
    pub fn degraded(
        requested: Mode,
        analysis: NormalizedAnalysis,
        elapsed: Duration,
        cause: &AnalysisError,
    ) -> Self {
        Self {
            success: true,
            mode: Mode::Mock,
            timestamp: Utc::now(),
            analysis,
            processing_time_ms: elapsed.as_millis() as u64,
            error: Some(cause.to_string()),
            degraded: true,
            requested_mode: requested,
        }
    }
}

/// Outcome of a backend connectivity check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityResult {
    pub success: bool,
    pub mode: Mode,
    pub message: String,

    /// Number of models the provider listed (OpenAI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_count: Option<usize>,
}

impl ConnectivityResult {
    pub fn ok(mode: Mode, message: impl Into<String>) -> Self {
        Self {
            success: true,
            mode,
            message: message.into(),
            model_count: None,
        }
    }

    pub fn failed(mode: Mode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            mode,
            message: message.into(),
            model_count: None,
        }
    }
}
