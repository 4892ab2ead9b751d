//! LLM client port
//!
//! Defines the interface for requesting a chat completion from a provider.

use async_trait::async_trait;
use roundtable_domain::{ChatMessage, Completion, Model};
use std::time::Duration;
use thiserror::Error;

/// A single chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: Model,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: Model, messages: Vec<ChatMessage>, max_tokens: u32) -> Self {
        Self {
            model,
            messages,
            max_tokens,
        }
    }
}

/// Errors that can occur during LLM client operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider error (status {status}): {message}")]
    Provider { status: u16, message: String },
}

/// Whether retrying a failed call can help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Fatal,
}

impl LlmError {
    /// Timeouts, rate limits, network failures and 5xx responses are
    /// transient; everything else is fatal for the calling agent.
    pub fn class(&self) -> ErrorClass {
        match self {
            LlmError::Timeout | LlmError::RateLimited { .. } | LlmError::Network(_) => {
                ErrorClass::Transient
            }
            LlmError::Provider { status, .. } if *status >= 500 => ErrorClass::Transient,
            LlmError::Authentication(_)
            | LlmError::InvalidRequest(_)
            | LlmError::Provider { .. } => ErrorClass::Fatal,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Provider-supplied wait hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Client for LLM chat completions
///
/// This port defines how the application layer talks to a model provider.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name recorded in the usage ledger (e.g. `"openai"`).
    fn provider(&self) -> &str;

    /// Request one completion
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;
}
