use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{CompletionRequest, LLMResponse, Message, ProviderAdapter, ProviderError};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAIConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

pub struct OpenAIAdapter {
    cfg: OpenAIConfig,
    client: Client,
}

impl OpenAIAdapter {
    pub fn new(mut cfg: OpenAIConfig) -> Result<Self, ProviderError> {
        if cfg.api_url.is_empty() {
            cfg.api_url = DEFAULT_API_URL.to_string();
        }
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|err| ProviderError::Network(err.to_string()))?;
        Ok(Self { cfg, client })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ProviderAdapter for OpenAIAdapter {
    fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
        let payload = ChatRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };
        debug!(url = %self.cfg.api_url, model = %request.model, "sending completion request");

        let resp = self
            .client
            .post(&self.cfg.api_url)
            .header("Content-Type", "application/json")
            .bearer_auth(&request.api_key)
            .json(&payload)
            .send()
            .map_err(|err| ProviderError::Network(err.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|err| ProviderError::Network(err.to_string()))?;
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        parse_response(&body)
    }
}

/// The provider's `error.message`, if the body carries one.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|raw| {
            raw.get("error")
                .and_then(|err| err.get("message"))
                .and_then(|msg| msg.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown error".to_string())
}

fn parse_response(body: &str) -> Result<LLMResponse, ProviderError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|err| ProviderError::Malformed(err.to_string()))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::Malformed("no completion in response".to_string()))?;
    Ok(LLMResponse {
        content: content.trim().to_string(),
        model: parsed.model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_provider_text() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key provided");
        assert_eq!(error_message("<html>bad gateway</html>"), "Unknown error");
    }

    #[test]
    fn parse_response_takes_first_choice_trimmed() {
        let body = r#"{"model": "gpt-3.5-turbo", "choices": [{"message": {"role": "assistant", "content": "  Title: Task: X \n"}}]}"#;
        let resp = parse_response(body).unwrap();
        assert_eq!(resp.content, "Title: Task: X");
        assert_eq!(resp.model.as_deref(), Some("gpt-3.5-turbo"));
    }

    #[test]
    fn parse_response_without_choices_is_malformed() {
        assert!(matches!(
            parse_response(r#"{"choices": []}"#),
            Err(ProviderError::Malformed(_))
        ));
        assert!(matches!(parse_response("nope"), Err(ProviderError::Malformed(_))));
    }
}
