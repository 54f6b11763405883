/// OpenAI chat-completions client for timesheet descriptions
use async_trait::async_trait;
use kintai_core::{ModelSummary, SummaryModel};
use kintai_domain::{KintaiError, Result};
use reqwest::Method;
use tracing::debug;

use crate::http::HttpClient;

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MAX_TOKENS: u32 = 100;
const DEFAULT_TEMPERATURE: f32 = 0.3;

const SYSTEM_INSTRUCTION: &str = "You rewrite developer activity summaries as timesheet \
     descriptions. Reply with a single line of at most 50 characters, business-facing, in the \
     same language as the input, with repository names and technical jargon stripped.";

/// Summary model backed by OpenAI's chat completions endpoint.
pub struct OpenAiSummaryModel {
    http: HttpClient,
    api_key: String,
    model: String,
    api_url: String,
}

impl OpenAiSummaryModel {
    pub fn new(api_key: String, model: impl Into<String>, http: HttpClient) -> Self {
        Self { http, api_key, model: model.into(), api_url: OPENAI_API_URL.to_string() }
    }

    /// Override the API URL (for testing against a mock server).
    #[cfg(test)]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[async_trait]
impl SummaryModel for OpenAiSummaryModel {
    async fn summarize(&self, summary: &str) -> Result<ModelSummary> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: SYSTEM_INSTRUCTION.to_string() },
                ChatMessage { role: "user".to_string(), content: summary.to_string() },
            ],
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        };

        let builder = self
            .http
            .request(Method::POST, &self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload);

        let response = self.http.send(builder).await?;
        let status = response.status();
        debug!(status = status.as_u16(), "received OpenAI response");

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(KintaiError::Config(format!("OpenAI rejected the API key ({status})")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KintaiError::Network(format!(
                "OpenAI request failed ({status}): {body}"
            )));
        }

        let chat: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| KintaiError::Network(format!("unexpected OpenAI response body: {e}")))?;

        let text = chat
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| KintaiError::Network("OpenAI response contained no choices".into()))?;

        Ok(ModelSummary {
            text,
            input_tokens: chat.usage.prompt_tokens,
            output_tokens: chat.usage.completion_tokens,
        })
    }
}
