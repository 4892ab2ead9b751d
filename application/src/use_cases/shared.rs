//! Shared utilities for use cases.
//!
//! Usage-ledger bookkeeping used by both the agent runtime and the
//! summarization engine.

use crate::config::Pricing;
use crate::ports::llm_client::LlmError;
use crate::ports::usage_ledger::{UsageLedger, UsageRecord, UsageStatus};
use chrono::Utc;
use roundtable_domain::{DiscussionId, Model, TokenUsage};
use std::time::Duration;
use tracing::warn;

pub(crate) const OPERATION_TURN: &str = "discussion_turn";
pub(crate) const OPERATION_SUMMARIZE: &str = "summarize";

/// What is being recorded, independent of the outcome.
pub(crate) struct CallMeta<'a> {
    pub provider: &'a str,
    pub model: &'a Model,
    pub operation: &'static str,
    pub discussion_id: &'a DiscussionId,
    pub pricing: Pricing,
}

impl CallMeta<'_> {
    pub fn success(&self, usage: &TokenUsage, duration: Duration) -> UsageRecord {
        self.record(
            *usage,
            self.pricing.cost(usage),
            duration,
            UsageStatus::Success,
            None,
        )
    }

    pub fn failure(&self, error: &LlmError, duration: Duration) -> UsageRecord {
        self.record(
            TokenUsage::default(),
            0.0,
            duration,
            UsageStatus::Error,
            Some(error.to_string()),
        )
    }

    fn record(
        &self,
        usage: TokenUsage,
        cost: f64,
        duration: Duration,
        status: UsageStatus,
        error_message: Option<String>,
    ) -> UsageRecord {
        UsageRecord {
            api_type: "chat".to_string(),
            provider: self.provider.to_string(),
            model: self.model.to_string(),
            operation: self.operation.to_string(),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            cost,
            duration_ms: duration.as_millis() as u64,
            status,
            error_message,
            discussion_id: Some(self.discussion_id.to_string()),
            recorded_at: Utc::now(),
        }
    }
}

/// Record to the ledger, logging instead of propagating failures.
pub(crate) async fn record_usage(ledger: &dyn UsageLedger, record: UsageRecord) {
    let operation = record.operation.clone();
    if let Err(e) = ledger.record(record).await {
        warn!(error = %e, operation = %operation, "Failed to record usage");
    }
}
