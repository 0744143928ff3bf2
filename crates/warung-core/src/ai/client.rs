//! HTTP client for the chat-completion provider.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, UpstreamError};
use crate::models::config::AiProviderConfig;

/// Parameters for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Interface to a chat-completion provider.
#[allow(async_fn_in_trait)]
pub trait CompletionProvider {
    /// Run one completion and return the first choice's message content.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Client speaking the OpenAI-compatible chat-completion wire format.
pub struct ChatClient {
    http: reqwest::Client,
    config: AiProviderConfig,
}

impl ChatClient {
    pub fn new(config: AiProviderConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Completion {
                message: e.to_string(),
            })?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl CompletionProvider for ChatClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Completion {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            // Keep the provider's diagnostic body for logging.
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            return Err(UpstreamError::Completion {
                message: format!("{status}: {message}"),
            }
            .into());
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(|e| UpstreamError::Completion {
                message: e.to_string(),
            })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = ChatClient::new(AiProviderConfig {
            base_url: "https://api.example.com/v1/".into(),
            api_key: "k".into(),
            ..AiProviderConfig::default()
        })
        .unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn response_decodes_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let decoded: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.choices[0].message.content, "hello");
    }

    #[test]
    fn response_tolerates_missing_choices() {
        let decoded: ChatCompletionResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(decoded.choices.is_empty());
    }
}
