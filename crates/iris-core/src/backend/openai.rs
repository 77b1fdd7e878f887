//! OpenAI backend using the Chat Completions API.
//!
//! Sends the image via data URL in the user message content array, then
//! normalizes the free-text answer heuristically.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::image::LoadedImage;
use crate::config::{Mode, OpenAiConfig};
use crate::error::{AnalysisError, BackendResult};
use crate::normalize;
use crate::types::{
    AnalysisKind, AnalysisOptions, ConnectivityResult, ImageDetail, NormalizedAnalysis,
};

const DEFAULT_MAX_TOKENS: u32 = 300;
/// Upload formats the Chat Completions API accepts.
const ACCEPTED_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenAI provider using Chat Completions API.
pub struct OpenAiBackend {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(client: reqwest::Client, api_key: &str, config: &OpenAiConfig) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Prompt sent with the image: the caller's prompt, or one derived from
    /// the analysis type.
    pub fn prompt_for(options: &AnalysisOptions) -> String {
        if let Some(prompt) = options.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            return prompt.to_string();
        }
        let prompt = match options.analysis_type.unwrap_or_default() {
            AnalysisKind::General => {
                "Analyze this image. Describe the main objects, the dominant colors, \
                 any visible text, and the overall mood."
            }
            AnalysisKind::Objects => "List the objects visible in this image.",
            AnalysisKind::Text => "Read and transcribe any text visible in this image.",
            AnalysisKind::Colors => "Describe the dominant colors in this image.",
            AnalysisKind::Sentiment => "Describe the mood and emotional tone of this image.",
        };
        prompt.to_string()
    }

    pub async fn analyze(
        &self,
        image: &LoadedImage,
        options: &AnalysisOptions,
    ) -> BackendResult<NormalizedAnalysis> {
        let text = self.complete(image, options).await?;
        Ok(normalize::openai::normalize(&text, image.metadata.clone()))
    }

    async fn complete(
        &self,
        image: &LoadedImage,
        options: &AnalysisOptions,
    ) -> BackendResult<String> {
        if !image
            .media_type()
            .is_some_and(|mime| ACCEPTED_MEDIA_TYPES.contains(&mime))
        {
            return Err(backend_error(
                format!(
                    "OpenAI Vision does not accept {} images",
                    image.metadata.format
                ),
                None,
            ));
        }

        let body = ChatRequest {
            model: self.model.clone(),
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: Self::prompt_for(options),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_url(),
                            detail: options.detail.unwrap_or_default(),
                        },
                    },
                ],
            }],
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                backend_error(format!("OpenAI request failed: {}", e.without_url()), None)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(backend_error(
                format!("OpenAI HTTP {status}: {text}"),
                Some(status.as_u16()),
            ));
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| {
            backend_error(
                format!("Failed to parse OpenAI response: {}", e.without_url()),
                None,
            )
        })?;

        let text = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| backend_error("OpenAI returned no content".to_string(), None))?;

        tracing::debug!(
            "OpenAI answered with {} chars (model {}, {} tokens)",
            text.len(),
            chat_resp.model,
            chat_resp.usage.map(|u| u.total_tokens).unwrap_or(0)
        );
        Ok(text)
    }

    /// List models to confirm the key and endpoint work.
    pub async fn test_connection(&self) -> ConnectivityResult {
        let result = self
            .client
            .get(format!("{}/models", self.endpoint))
            .bearer_auth(&self.api_key)
            .timeout(CONNECTION_TIMEOUT)
            .send()
            .await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                return ConnectivityResult::failed(
                    Mode::OpenAi,
                    format!("OpenAI request failed: {}", e.without_url()),
                )
            }
        };
        let status = resp.status();
        if !status.is_success() {
            return ConnectivityResult::failed(Mode::OpenAi, format!("OpenAI HTTP {status}"));
        }

        match resp.json::<ModelList>().await {
            Ok(list) => {
                let count = list.data.len();
                let mut result = ConnectivityResult::ok(
                    Mode::OpenAi,
                    format!("Connected to OpenAI: {count} models available"),
                );
                result.model_count = Some(count);
                result
            }
            Err(e) => ConnectivityResult::failed(
                Mode::OpenAi,
                format!("Failed to parse OpenAI model list: {}", e.without_url()),
            ),
        }
    }
}

fn backend_error(message: String, status_code: Option<u16>) -> AnalysisError {
    AnalysisError::Backend {
        provider: Mode::OpenAi,
        message,
        status_code,
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
    detail: ImageDetail,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<serde_json::Value>,
}
