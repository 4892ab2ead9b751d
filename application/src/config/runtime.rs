//! Runtime configuration for agent turns.

use roundtable_domain::{Model, TokenUsage};
use serde::{Deserialize, Serialize};

/// How retried calls are reported to the usage ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAccounting {
    /// One record per attempt, each with its own status and duration.
    #[default]
    PerAttempt,
    /// One record per turn, its duration spanning every attempt.
    PerTurn,
}

impl RetryAccounting {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryAccounting::PerAttempt => "per_attempt",
            RetryAccounting::PerTurn => "per_turn",
        }
    }
}

impl std::str::FromStr for RetryAccounting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "per_attempt" => Ok(RetryAccounting::PerAttempt),
            "per_turn" => Ok(RetryAccounting::PerTurn),
            other => Err(format!("unknown retry accounting '{}'", other)),
        }
    }
}

/// USD per thousand tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub prompt_per_1k: f64,
    pub completion_per_1k: f64,
}

impl Pricing {
    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        usage.prompt_tokens as f64 / 1000.0 * self.prompt_per_1k
            + usage.completion_tokens as f64 / 1000.0 * self.completion_per_1k
    }
}

/// Settings shared by every agent turn and summary call.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Model for personas without an override.
    pub default_model: Model,
    pub max_tokens: u32,
    /// Raw messages after the last summary included in a turn prompt.
    pub context_window: usize,
    pub retry_accounting: RetryAccounting,
    pub pricing: Pricing,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_model: Model::default(),
            max_tokens: 1024,
            context_window: 20,
            retry_accounting: RetryAccounting::default(),
            pricing: Pricing::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn with_default_model(mut self, model: Model) -> Self {
        self.default_model = model;
        self
    }

    pub fn with_retry_accounting(mut self, accounting: RetryAccounting) -> Self {
        self.retry_accounting = accounting;
        self
    }

    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }
}
