//! Iris Core - Embeddable image analysis router.
//!
//! Iris sends an image to one of several interchangeable backends (a mock
//! generator, OpenAI Vision, Google Cloud Vision, or a local placeholder),
//! normalizes the answer into one common shape, and caches it by request
//! fingerprint.
//!
//! # Architecture
//!
//! ```text
//! Image → Fingerprint → Cache? → Load + Sniff → Backend (timeout) → Normalize → Result
//!                                                   ↘ failure → mock fallback (degraded)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use iris_core::{AnalysisOptions, Analyzer, Config};
//!
//! #[tokio::main]
//! async fn main() -> iris_core::Result<()> {
//!     let analyzer = Analyzer::new(Config::load()?)?;
//!
//!     let result = analyzer
//!         .analyze_image("./cat.jpg", &AnalysisOptions::default())
//!         .await?;
//!     println!("Objects: {:?}", result.analysis.objects);
//!     println!("Stats: {:?}", analyzer.stats());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod analyzer;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod normalize;
pub mod stats;
pub mod types;

// Re-exports for convenient access
pub use analyzer::Analyzer;
pub use config::{Config, ConfigUpdate, FallbackPolicy, Mode};
pub use error::{AnalysisError, BackendResult, ConfigError, IrisError, Result};
pub use stats::Stats;
pub use types::{
    AnalysisKind, AnalysisOptions, AnalysisResult, ConnectivityResult, ImageDetail,
    ImageMetadata, ImageSource, NormalizedAnalysis, Sentiment,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_analyzer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Analyzer>();
    }
}
