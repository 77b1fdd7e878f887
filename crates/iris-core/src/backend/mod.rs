//! Analysis backends.
//!
//! A [`Backend`] is built per request from the current configuration, so key
//! and endpoint changes made through `update_config` apply to the next call.

pub mod google;
pub mod image;
pub mod mock;
pub mod openai;

pub use google::GoogleBackend;
pub use image::LoadedImage;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;

use crate::config::{Config, Mode};
use crate::error::{AnalysisError, BackendResult};
use crate::types::{AnalysisOptions, ConnectivityResult, NormalizedAnalysis};

/// Resolve `${ENV_VAR}` references in config values.
///
/// An empty value, or a reference to an unset variable, resolves to `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    let resolved = if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()?
    } else {
        value.to_string()
    };
    if resolved.trim().is_empty() {
        None
    } else {
        Some(resolved)
    }
}

/// Placeholder for an on-device model. Produces mock analyses for now.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    model: String,
    mock: MockBackend,
}

impl LocalBackend {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            mock: MockBackend::new(),
        }
    }

    pub fn analyze(&self, image: &LoadedImage) -> NormalizedAnalysis {
        tracing::debug!("Local model {} not wired up, using mock generator", self.model);
        self.mock.generate(&image.metadata)
    }
}

/// One configured backend, ready to dispatch.
pub enum Backend {
    Mock(MockBackend),
    OpenAi(OpenAiBackend),
    Google(GoogleBackend),
    Local(LocalBackend),
}

impl Backend {
    /// Build the backend for `config.mode`, resolving its API key.
    pub fn from_config(config: &Config, client: &reqwest::Client) -> BackendResult<Self> {
        match config.mode {
            Mode::Mock => Ok(Backend::Mock(MockBackend::new())),
            Mode::OpenAi => {
                let api_key = resolve_env_var(&config.openai.api_key).ok_or_else(|| {
                    AnalysisError::Configuration {
                        provider: Mode::OpenAi,
                        message: "API key not set. Set OPENAI_API_KEY or openai.api_key."
                            .to_string(),
                    }
                })?;
                Ok(Backend::OpenAi(OpenAiBackend::new(
                    client.clone(),
                    &api_key,
                    &config.openai,
                )))
            }
            Mode::Google => {
                let api_key = resolve_env_var(&config.google.api_key).ok_or_else(|| {
                    AnalysisError::Configuration {
                        provider: Mode::Google,
                        message: "API key not set. Set GOOGLE_VISION_API_KEY or google.api_key."
                            .to_string(),
                    }
                })?;
                Ok(Backend::Google(GoogleBackend::new(
                    client.clone(),
                    &api_key,
                    &config.google,
                )))
            }
            Mode::Local => Ok(Backend::Local(LocalBackend::new(&config.local.model))),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Backend::Mock(_) => Mode::Mock,
            Backend::OpenAi(_) => Mode::OpenAi,
            Backend::Google(_) => Mode::Google,
            Backend::Local(_) => Mode::Local,
        }
    }

    pub async fn analyze(
        &self,
        image: &LoadedImage,
        options: &AnalysisOptions,
    ) -> BackendResult<NormalizedAnalysis> {
        match self {
            Backend::Mock(mock) => Ok(mock.generate(&image.metadata)),
            Backend::OpenAi(openai) => openai.analyze(image, options).await,
            Backend::Google(google) => google.analyze(image).await,
            Backend::Local(local) => Ok(local.analyze(image)),
        }
    }

    pub async fn test_connection(&self) -> ConnectivityResult {
        match self {
            Backend::Mock(_) => {
                ConnectivityResult::ok(Mode::Mock, "Mock backend is always available")
            }
            Backend::OpenAi(openai) => openai.test_connection().await,
            Backend::Google(google) => google.test_connection(),
            Backend::Local(local) => ConnectivityResult::ok(
                Mode::Local,
                format!("Local backend ({}) answers with mock analyses", local.model),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_env_var_literal() {
        assert_eq!(resolve_env_var("sk-literal"), Some("sk-literal".to_string()));
        assert_eq!(resolve_env_var(""), None);
        assert_eq!(resolve_env_var("   "), None);
    }

    #[test]
    fn test_resolve_env_var_reference() {
        std::env::set_var("IRIS_TEST_RESOLVE_KEY", "from-env");
        assert_eq!(
            resolve_env_var("${IRIS_TEST_RESOLVE_KEY}"),
            Some("from-env".to_string())
        );
        assert_eq!(resolve_env_var("${IRIS_TEST_SURELY_UNSET_VAR}"), None);
    }

    #[test]
    fn test_from_config_requires_openai_key() {
        let mut config = Config::default();
        config.mode = Mode::OpenAi;
        config.openai.api_key = String::new();

        let err = Backend::from_config(&config, &reqwest::Client::new())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            AnalysisError::Configuration {
                provider: Mode::OpenAi,
                ..
            }
        ));
    }

    #[test]
    fn test_from_config_builds_each_mode() {
        let client = reqwest::Client::new();
        let mut config = Config::default();
        config.openai.api_key = "sk-test".to_string();
        config.google.api_key = "g-test".to_string();

        for mode in [Mode::Mock, Mode::OpenAi, Mode::Google, Mode::Local] {
            config.mode = mode;
            let backend = Backend::from_config(&config, &client).unwrap();
            assert_eq!(backend.mode(), mode);
        }
    }

    #[tokio::test]
    async fn test_local_delegates_to_mock() {
        let mut config = Config::default();
        config.mode = Mode::Local;
        let backend = Backend::from_config(&config, &reqwest::Client::new()).unwrap();

        let image = LoadedImage::from_bytes(vec![0u8; 64]);
        let analysis = backend
            .analyze(&image, &AnalysisOptions::default())
            .await
            .unwrap();
        assert!(mock::OBJECT_SETS
            .iter()
            .any(|set| set.iter().copied().eq(analysis.objects.iter().map(String::as_str))));

        let connectivity = backend.test_connection().await;
        assert!(connectivity.success);
        assert_eq!(connectivity.mode, Mode::Local);
    }
}
