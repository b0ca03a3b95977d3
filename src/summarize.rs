//! AI summarization collaborator.
//!
//! A single request/response call against an OpenAI-compatible chat
//! completions endpoint. Failures are classified into [`SummarizeError`]
//! categories and handed back to the caller; nothing is retried, since there
//! is no fallback way to produce a summary.
//!
//! # Architecture
//!
//! - [`Summarize`]: the seam callers depend on
//! - [`ChatCompletionClient`]: the HTTP implementation

use crate::config::SummarizerConfig;
use crate::error::SummarizeError;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

const SYSTEM_PROMPT: &str = "당신은 뉴스 기사를 간결하게 요약하는 AI 어시스턴트입니다.
다음 규칙을 따라주세요:
1. 핵심 내용을 3-5문장으로 요약
2. 중요한 사실과 수치 포함
3. 객관적이고 중립적인 톤 유지
4. 한국어로 답변";

/// Something that can summarize article text.
pub trait Summarize {
    /// Summarize `text`, returning the generated summary.
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Chat completion response body. Only the fields read here are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Build the request for summarizing `content`.
pub fn build_request(config: &SummarizerConfig, content: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: vec![
            Message {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            Message {
                role: "user".to_string(),
                content: format!("다음 뉴스 기사를 요약해주세요:\n\n{content}"),
            },
        ],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

/// Map a non-success HTTP status to a failure category.
pub fn classify_status(status: StatusCode) -> SummarizeError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SummarizeError::InvalidCredential,
        StatusCode::TOO_MANY_REQUESTS => SummarizeError::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => SummarizeError::Timeout,
        other => SummarizeError::Other(format!("status {}", other.as_u16())),
    }
}

/// HTTP client for the chat completions endpoint.
pub struct ChatCompletionClient {
    client: Client,
    config: SummarizerConfig,
    api_key: Option<String>,
}

impl fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("api_key_set", &self.api_key.is_some())
            .finish()
    }
}

impl ChatCompletionClient {
    /// A client with `config.timeout_secs` as its request timeout. A blank
    /// `api_key` counts as missing, so every call fails with
    /// [`SummarizeError::MissingCredential`].
    pub fn new(config: SummarizerConfig, api_key: Option<String>) -> Result<Self, SummarizeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SummarizeError::Other(e.to_string()))?;
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        Ok(Self {
            client,
            config,
            api_key,
        })
    }
}

impl Summarize for ChatCompletionClient {
    #[instrument(level = "info", skip_all, fields(model = %self.config.model, chars = text.chars().count()))]
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let api_key = self.api_key.as_deref().ok_or(SummarizeError::MissingCredential)?;
        let url = format!("{}/v1/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = build_request(&self.config, text);

        let t0 = Instant::now();
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(SummarizeError::from)?;

        let status = response.status();
        if !status.is_success() {
            let err = classify_status(status);
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis(),
                body = %truncate_for_log(&body, 300),
                error = %err,
                "Summarization request rejected"
            );
            return Err(err);
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Summarization response was not valid JSON");
            SummarizeError::Other(e.to_string())
        })?;

        let summary = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(SummarizeError::EmptyResponse)?;

        info!(
            elapsed_ms = t0.elapsed().as_millis(),
            total_tokens = parsed.usage.map(|u| u.total_tokens).unwrap_or_default(),
            "Summarization succeeded"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer, key: Option<&str>) -> ChatCompletionClient {
        let config = SummarizerConfig {
            base_url: server.base_url(),
            timeout_secs: 5,
            ..SummarizerConfig::default()
        };
        ChatCompletionClient::new(config, key.map(str::to_string)).unwrap()
    }

    #[test]
    fn test_build_request_shape() {
        let request = build_request(&SummarizerConfig::default(), "본문");
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.max_tokens, 500);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert!(request.messages[1].content.ends_with("\n\n본문"));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), SummarizeError::InvalidCredential);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), SummarizeError::RateLimited);
        assert_eq!(classify_status(StatusCode::GATEWAY_TIMEOUT), SummarizeError::Timeout);
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            SummarizeError::Other(_)
        ));
    }

    #[tokio::test]
    async fn test_summarize_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .json_body_partial(r#"{"model": "gpt-3.5-turbo", "max_tokens": 500}"#);
            then.status(200).json_body(json!({
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "  요약입니다.  "}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            }));
        });

        let client = client_for(&server, Some("sk-test"));
        let summary = client.summarize("기사 본문").await.unwrap();
        mock.assert();
        assert_eq!(summary, "요약입니다.");
    }

    #[tokio::test]
    async fn test_summarize_missing_key_makes_no_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200);
        });

        let client = client_for(&server, Some("   "));
        let err = client.summarize("기사 본문").await.unwrap_err();
        assert_eq!(err, SummarizeError::MissingCredential);
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_summarize_invalid_key() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401).body(r#"{"error": {"message": "Incorrect API key"}}"#);
        });

        let err = client_for(&server, Some("sk-bad")).summarize("x").await.unwrap_err();
        assert_eq!(err, SummarizeError::InvalidCredential);
    }

    #[tokio::test]
    async fn test_summarize_rate_limited() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429);
        });

        let err = client_for(&server, Some("sk-test")).summarize("x").await.unwrap_err();
        assert_eq!(err, SummarizeError::RateLimited);
    }

    #[tokio::test]
    async fn test_summarize_empty_choices() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({"choices": [], "usage": null}));
        });

        let err = client_for(&server, Some("sk-test")).summarize("x").await.unwrap_err();
        assert_eq!(err, SummarizeError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_summarize_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).delay(Duration::from_secs(3)).json_body(json!({"choices": []}));
        });

        let config = SummarizerConfig {
            base_url: server.base_url(),
            timeout_secs: 1,
            ..SummarizerConfig::default()
        };
        let client = ChatCompletionClient::new(config, Some("sk-test".to_string())).unwrap();
        let err = client.summarize("x").await.unwrap_err();
        assert_eq!(err, SummarizeError::Timeout);
    }
}
