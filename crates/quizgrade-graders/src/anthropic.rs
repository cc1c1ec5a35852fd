//! Anthropic API grading backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizgrade_core::traits::{extract_json_object, JudgeRequest, Judgment, RubricJudge};

use crate::error::GraderError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const SYSTEM_PROMPT: &str = "You are a strict grading assistant for a learning app. You receive one grading task and respond ONLY with the requested JSON object. No prose, no markdown, no explanations outside the JSON.";

/// Anthropic API rubric judge.
pub struct AnthropicJudge {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl AnthropicJudge {
    pub fn new(api_key: &str, base_url: Option<String>, model: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        }
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    system: String,
    messages: Vec<AnthropicMessage>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String,
}

#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

#[async_trait]
impl RubricJudge for AnthropicJudge {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn judge(&self, request: &JudgeRequest) -> anyhow::Result<Judgment> {
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 512,
            // Grading should be deterministic
            temperature: 0.0,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GraderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    GraderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(GraderError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GraderError::ApiError { status, message }.into());
        }

        let api_response: AnthropicResponse =
            response.json().await.map_err(|e| GraderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let content = api_response
            .content
            .first()
            .map(|c| c.text.as_str())
            .unwrap_or_default();

        parse_judgment(content)
    }
}

/// Parse a judgment from raw model output.
pub(crate) fn parse_judgment(content: &str) -> anyhow::Result<Judgment> {
    let json = extract_json_object(content)
        .ok_or_else(|| GraderError::MalformedJudgment(format!("no JSON object in: {content}")))?;
    let judgment: Judgment = serde_json::from_str(&json)
        .map_err(|e| GraderError::MalformedJudgment(format!("{e}: {json}")))?;
    Ok(judgment)
}
