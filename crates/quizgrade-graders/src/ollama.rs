//! Ollama (local LLM) grading backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizgrade_core::traits::{JudgeRequest, Judgment, RubricJudge};

use crate::anthropic::parse_judgment;
use crate::error::GraderError;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.1:8b";
const DEFAULT_TIMEOUT_SECS: u64 = 300; // Local models are slower
const SYSTEM_PROMPT: &str = "You are a strict grading assistant for a learning app. You receive one grading task and respond ONLY with the requested JSON object. No prose, no markdown, no explanations outside the JSON.";

/// Ollama local rubric judge.
pub struct OllamaJudge {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaJudge {
    pub fn new(base_url: &str, model: Option<String>) -> Self {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base.to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    format: String,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[async_trait]
impl RubricJudge for OllamaJudge {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn judge(&self, request: &JudgeRequest) -> anyhow::Result<Judgment> {
        let body = OllamaRequest {
            model: self.model.clone(),
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            stream: false,
            format: "json".to_string(),
            options: OllamaOptions { temperature: 0.0 },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GraderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else if e.is_connect() {
                    GraderError::NetworkError(format!(
                        "Ollama not reachable at {}. Is it running? Start with: ollama serve",
                        self.base_url
                    ))
                } else {
                    GraderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(GraderError::ApiError {
                status,
                message: format!(
                    "Model '{}' not found locally. Pull it with: ollama pull {}",
                    self.model, self.model
                ),
            }
            .into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(GraderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let api_response: OllamaResponse =
            response.json().await.map_err(|e| GraderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        parse_judgment(&api_response.message.content)
    }
}
