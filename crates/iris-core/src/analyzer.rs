//! The analyzer: dispatch, fallback, caching and statistics.
//!
//! One `Analyzer` owns its configuration, result cache and stats. It is
//! `Send + Sync`; share it behind an `Arc` for concurrent requests. The config
//! is snapshotted at the start of each request, so an `update_config` racing
//! with an in-flight call only affects later calls.

use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::backend::{Backend, LoadedImage, MockBackend};
use crate::cache::{Fingerprint, ResultCache};
use crate::config::{Config, ConfigUpdate, FallbackPolicy};
use crate::error::{AnalysisError, BackendResult, ConfigError, Result};
use crate::stats::{Stats, StatsTracker};
use crate::types::{
    AnalysisOptions, AnalysisResult, ConnectivityResult, ImageSource, NormalizedAnalysis,
};

/// Routes image analysis requests to the configured backend.
pub struct Analyzer {
    config: RwLock<Config>,
    cache: ResultCache,
    stats: StatsTracker,
    client: reqwest::Client,
}

impl Analyzer {
    /// Build an analyzer around `config`, which must pass the same checks
    /// as [`Analyzer::update_config`].
    pub fn new(config: Config) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!("Initializing Iris v{} in {} mode", crate::VERSION, config.mode);
        Ok(Self {
            config: RwLock::new(config),
            cache: ResultCache::new(),
            stats: StatsTracker::new(),
            client: reqwest::Client::new(),
        })
    }

    /// Create an analyzer from the config file at the default location.
    pub fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::new(config)?)
    }

    /// Snapshot of the active configuration.
    pub fn config(&self) -> Config {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Analyze one image with the active backend.
    ///
    /// Backend failures are replaced by a degraded mock result unless the
    /// fallback policy is [`FallbackPolicy::Surface`]. Unreadable inputs are
    /// always returned as [`AnalysisError::Input`].
    pub async fn analyze_image(
        &self,
        source: impl Into<ImageSource>,
        options: &AnalysisOptions,
    ) -> std::result::Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        let source = source.into();
        let config = self.config();

        self.stats.record_request();
        let key = Fingerprint::new(config.mode, &source, options);

        if config.cache.enabled {
            if let Some(cached) = self.cache.get(&key, config.cache.ttl()) {
                tracing::debug!("Cache hit for {}", source.describe());
                self.stats.record_cache_hit();
                return Ok(cached);
            }
        }

        let image = match LoadedImage::load(source, &config.limits).await {
            Ok(image) => image,
            Err(e) => {
                self.stats.record_failure();
                return Err(e);
            }
        };

        match self.dispatch(&config, &image, options).await {
            Ok(analysis) => {
                let elapsed = started.elapsed();
                self.stats.record_success(elapsed.as_secs_f64() * 1000.0);
                let result = AnalysisResult::completed(config.mode, analysis, elapsed);
                if config.cache.enabled {
                    self.cache.insert(key, result.clone(), config.cache.ttl());
                }
                Ok(result)
            }
            Err(error) => {
                self.stats.record_failure();
                tracing::warn!("{} analysis failed: {error}", config.mode);
                match config.fallback {
                    FallbackPolicy::Mock => {
                        let analysis = MockBackend::new().generate(&image.metadata);
                        Ok(AnalysisResult::degraded(
                            config.mode,
                            analysis,
                            started.elapsed(),
                            &error,
                        ))
                    }
                    FallbackPolicy::Surface => Err(error),
                }
            }
        }
    }

    async fn dispatch(
        &self,
        config: &Config,
        image: &LoadedImage,
        options: &AnalysisOptions,
    ) -> BackendResult<NormalizedAnalysis> {
        let backend = Backend::from_config(config, &self.client)?;
        let timeout_ms = config.limits.timeout_ms;
        tracing::debug!(
            "Dispatching {} ({} bytes) to {} backend",
            image.metadata.format,
            image.metadata.size_bytes,
            backend.mode()
        );

        match tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            backend.analyze(image, options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::Timeout {
                provider: backend.mode(),
                timeout_ms,
            }),
        }
    }

    /// Check that the active backend is usable.
    pub async fn test_connection(&self) -> ConnectivityResult {
        let config = self.config();
        let result = match Backend::from_config(&config, &self.client) {
            Ok(backend) => backend.test_connection().await,
            Err(e) => ConnectivityResult::failed(config.mode, e.to_string()),
        };
        tracing::info!(
            "{} connectivity: {} ({})",
            result.mode,
            if result.success { "ok" } else { "failed" },
            result.message
        );
        result
    }

    pub fn stats(&self) -> Stats {
        self.stats.snapshot()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Result cache cleared");
    }

    /// Number of results currently cached. Expired entries linger until the
    /// next insert.
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    /// Merge `update` over the active config.
    ///
    /// Invalid results are rejected and leave the config untouched. Switching
    /// modes clears the cache; results still in flight from the old mode are
    /// keyed by that mode and never answer for the new one.
    pub fn update_config(&self, update: &ConfigUpdate) -> std::result::Result<(), ConfigError> {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let merged = config.merged(update);
        merged.validate()?;

        let mode_changed = merged.mode != config.mode;
        if mode_changed {
            tracing::info!("Switching mode {} -> {}", config.mode, merged.mode);
            self.cache.clear();
        }
        *config = merged;
        Ok(())
    }
}
