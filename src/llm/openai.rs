use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::LlmConfig;
use crate::errors::ApiError;

use super::provider::CompletionBackend;
use super::types::CompletionRequest;

/// Client for OpenAI-compatible chat-completions APIs.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "stream": false,
        });

        let mut call = self.client.post(&url).timeout(self.timeout).json(&body);
        if !self.api_key.is_empty() {
            call = call.bearer_auth(&self.api_key);
        }

        let res = call.send().await.map_err(ApiError::provider)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Provider(format!(
                "chat completions returned {}: {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(ApiError::provider)?;

        completion_content(&payload)
            .ok_or_else(|| ApiError::EmptyResult("no completion content".to_string()))
    }
}

/// Pull the assistant text out of a chat-completions payload. Blank or
/// missing content is treated as absent.
fn completion_content(payload: &Value) -> Option<String> {
    let content = payload["choices"][0]["message"]["content"].as_str()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assistant_content() {
        let payload = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "  SEARCH  "}}
            ]
        });
        assert_eq!(completion_content(&payload).as_deref(), Some("SEARCH"));
    }

    #[test]
    fn missing_choices_is_none() {
        assert_eq!(completion_content(&json!({})), None);
        assert_eq!(completion_content(&json!({"choices": []})), None);
    }

    #[test]
    fn null_or_blank_content_is_none() {
        let null_content = json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        });
        assert_eq!(completion_content(&null_content), None);

        let blank = json!({
            "choices": [{"message": {"role": "assistant", "content": "   "}}]
        });
        assert_eq!(completion_content(&blank), None);
    }
}
