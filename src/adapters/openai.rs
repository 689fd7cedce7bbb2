use crate::adapters::retry::{log_retry, status_error, RetryPolicy};
use crate::domain::ports::{ChatMessage, LlmClient};
use crate::utils::error::{Result, VenueError};
use async_trait::async_trait;
use backon::Retryable;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Chat completions against the OpenAI API or any compatible endpoint.
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    settings: CompletionSettings,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl OpenAiClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        settings: CompletionSettings,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            settings,
            retry,
        })
    }

    async fn complete_once(&self, messages: &[ChatMessage]) -> Result<String> {
        let payload = CompletionRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            messages,
        };

        tracing::debug!(
            "[OpenAI] Sending request: model={}, messages={}",
            self.settings.model,
            messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("OpenAI", status, body));
        }

        let parsed: CompletionResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                "[OpenAI] Tokens: prompt={}, completion={}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| VenueError::MalformedResponse {
                message: "completion has no content".to_string(),
            })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let messages = messages.as_slice();
        (move || self.complete_once(messages))
            .retry(self.retry.backoff())
            .when(VenueError::is_retryable)
            .notify(log_retry("OpenAI"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer, retries: u32) -> OpenAiClient {
        OpenAiClient::new(
            server.url("/v1/chat/completions"),
            "sk-test",
            CompletionSettings {
                model: "gpt-4o-mini".to_string(),
                temperature: 0.2,
                max_tokens: 800,
            },
            Duration::from_secs(5),
            RetryPolicy::new(retries, Duration::from_millis(1)),
        )
        .unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        })
    }

    #[tokio::test]
    async fn test_complete_sends_model_and_messages() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("Authorization", "Bearer sk-test")
                .body_contains("\"model\":\"gpt-4o-mini\"")
                .body_contains("\"max_tokens\":800")
                .body_contains(r#"{"role":"system","content":"You score venues."}"#)
                .body_contains(r#"{"role":"user","content":"Score Dock Hall."}"#);
            then.status(200).json_body(completion("  {\"score\": 80}  "));
        });

        let reply = client(&server, 0)
            .complete(vec![
                ChatMessage::system("You score venues."),
                ChatMessage::user("Score Dock Hall."),
            ])
            .await
            .unwrap();

        mock.assert();
        assert_eq!(reply, "{\"score\": 80}");
    }

    #[tokio::test]
    async fn test_empty_choices_are_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({"choices": []}));
        });

        let err = client(&server, 0)
            .complete(vec![ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, VenueError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried_then_reported() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429).body("slow down");
        });

        let err = client(&server, 1)
            .complete(vec![ChatMessage::user("hi")])
            .await
            .unwrap_err();

        mock.assert_hits(2);
        assert!(matches!(err, VenueError::RateLimited { .. }));
    }
}
