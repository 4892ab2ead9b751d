//! OpenAI-compatible chat completions client
//!
//! Works with any endpoint that speaks the `/chat/completions` wire format
//! (OpenAI, Azure OpenAI, Ollama, vLLM, LM Studio). HTTP failures are
//! mapped onto [`LlmError`] so the runtime can tell transient from fatal.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use roundtable_application::{CompletionRequest, LlmClient, LlmError};
use roundtable_domain::{ChatMessage, Completion, FinishReason, TokenUsage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// [`LlmClient`] over HTTP.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http: Client,
    provider: String,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleClient {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, OpenAiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout.filter(|t| !t.is_zero()) {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            provider: "openai".to_string(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Name reported in usage records.
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider = name.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let body = ChatCompletionRequest {
            model: request.model.as_str(),
            messages: &request.messages,
            max_tokens: request.max_tokens,
        };
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion"
        );

        let mut http = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &text, retry_after));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Provider {
                status: status.as_u16(),
                message: format!("malformed response: {}", e),
            })?;
        into_completion(parsed)
    }
}

// ==================== Wire format ====================

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn into_completion(response: ChatCompletionResponse) -> Result<Completion, LlmError> {
    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Provider {
            status: 200,
            message: "response contained no choices".to_string(),
        })?;

    let content = choice.message.content.unwrap_or_default();
    let mut completion = Completion::new(content, usage);
    if let Some(reason) = choice.finish_reason.as_deref() {
        completion = completion.with_finish_reason(FinishReason::from_provider(reason));
    }
    Ok(completion)
}

// ==================== Error mapping ====================

fn map_transport_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Network(err.to_string())
    }
}

fn map_http_error(status: StatusCode, body: &str, retry_after: Option<Duration>) -> LlmError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { retry_after },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => LlmError::Timeout,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Authentication(message),
        StatusCode::BAD_REQUEST
        | StatusCode::NOT_FOUND
        | StatusCode::UNPROCESSABLE_ENTITY
        | StatusCode::PAYLOAD_TOO_LARGE => LlmError::InvalidRequest(message),
        _ => LlmError::Provider {
            status: status.as_u16(),
            message,
        },
    }
}

/// `Retry-After` in seconds; HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
