//! Google Cloud Vision backend using `images:annotate`.
//!
//! One request asks for every feature the normalized shape uses.

use serde::Serialize;

use super::image::LoadedImage;
use crate::config::{GoogleConfig, Mode};
use crate::error::{AnalysisError, BackendResult};
use crate::normalize::google::{self as google_normalize, BatchAnnotateResponse};
use crate::types::{ConnectivityResult, NormalizedAnalysis};

/// Google Cloud Vision provider.
///
/// The key travels in the query string, so request errors are reported
/// without their URL.
pub struct GoogleBackend {
    api_key: String,
    project_id: String,
    endpoint: String,
    max_labels: u32,
    client: reqwest::Client,
}

impl GoogleBackend {
    pub fn new(client: reqwest::Client, api_key: &str, config: &GoogleConfig) -> Self {
        Self {
            api_key: api_key.to_string(),
            project_id: config.project_id.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            max_labels: config.max_labels,
            client,
        }
    }

    fn features(&self) -> Vec<Feature> {
        vec![
            Feature::new("LABEL_DETECTION", Some(self.max_labels)),
            Feature::new("TEXT_DETECTION", None),
            Feature::new("FACE_DETECTION", None),
            Feature::new("LOGO_DETECTION", None),
            Feature::new("SAFE_SEARCH_DETECTION", None),
            Feature::new("IMAGE_PROPERTIES", None),
        ]
    }

    pub async fn analyze(&self, image: &LoadedImage) -> BackendResult<NormalizedAnalysis> {
        let body = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: image.base64(),
                },
                features: self.features(),
            }],
        };

        let mut request = self
            .client
            .post(format!("{}/images:annotate", self.endpoint))
            .query(&[("key", self.api_key.as_str())])
            .json(&body);
        if !self.project_id.is_empty() {
            request = request.header("x-goog-user-project", &self.project_id);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| {
                backend_error(
                    format!("Google Vision request failed: {}", e.without_url()),
                    None,
                )
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(backend_error(
                format!("Google Vision HTTP {status}: {text}"),
                Some(status.as_u16()),
            ));
        }

        let batch: BatchAnnotateResponse = resp.json().await.map_err(|e| {
            backend_error(
                format!("Failed to parse Google Vision response: {}", e.without_url()),
                None,
            )
        })?;

        let response = batch.responses.into_iter().next().ok_or_else(|| {
            backend_error("Google Vision returned no responses".to_string(), None)
        })?;
        if let Some(error) = &response.error {
            return Err(backend_error(
                format!("Google Vision error {}: {}", error.code, error.message),
                None,
            ));
        }

        tracing::debug!(
            "Google Vision returned {} labels, {} faces",
            response.label_annotations.len(),
            response.face_annotations.len()
        );
        Ok(google_normalize::normalize(response, image.metadata.clone()))
    }

    /// Reports key presence only; no request is made.
    pub fn test_connection(&self) -> ConnectivityResult {
        if self.api_key.is_empty() {
            ConnectivityResult::failed(Mode::Google, "Google Vision API key not set")
        } else {
            ConnectivityResult::ok(Mode::Google, "Google Vision API key configured")
        }
    }
}

fn backend_error(message: String, status_code: Option<u16>) -> AnalysisError {
    AnalysisError::Backend {
        provider: Mode::Google,
        message,
        status_code,
    }
}

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "maxResults", skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
}

impl Feature {
    fn new(kind: &'static str, max_results: Option<u32>) -> Self {
        Self { kind, max_results }
    }
}
