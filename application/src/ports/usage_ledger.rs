//! Usage ledger port
//!
//! Every model call, successful or not, is reported here with its token
//! counts and duration. Recording failures are logged by callers and never
//! interrupt a discussion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Ledger write failed: {0}")]
    Write(String),
}

/// Outcome of the recorded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageStatus {
    Success,
    Error,
}

impl UsageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageStatus::Success => "success",
            UsageStatus::Error => "error",
        }
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// API family, e.g. `"chat"`.
    pub api_type: String,
    pub provider: String,
    pub model: String,
    /// What the call was for: `"discussion_turn"` or `"summarize"`.
    pub operation: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    /// Estimated cost in USD.
    pub cost: f64,
    pub duration_ms: u64,
    pub status: UsageStatus,
    pub error_message: Option<String>,
    pub discussion_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Selects records for [`UsageLedger::query_stats`]. Empty fields match all.
#[derive(Debug, Clone, Default)]
pub struct UsageFilter {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub operation: Option<String>,
    pub discussion_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

impl UsageFilter {
    pub fn matches(&self, record: &UsageRecord) -> bool {
        self.provider.as_ref().is_none_or(|p| *p == record.provider)
            && self.model.as_ref().is_none_or(|m| *m == record.model)
            && self.operation.as_ref().is_none_or(|o| *o == record.operation)
            && self
                .discussion_id
                .as_ref()
                .is_none_or(|d| record.discussion_id.as_ref() == Some(d))
            && self.since.is_none_or(|since| record.recorded_at >= since)
    }
}

/// Aggregated usage for one provider/model/operation combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub provider: String,
    pub model: String,
    pub operation: String,
    pub calls: u64,
    pub failures: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub total_duration_ms: u64,
}

/// Port for recording model usage.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Store a record and return its id.
    async fn record(&self, record: UsageRecord) -> Result<String, LedgerError>;

    /// Aggregate matching records.
    async fn query_stats(&self, filter: &UsageFilter) -> Result<Vec<UsageStats>, LedgerError>;
}

/// No-op ledger for tests and when accounting is disabled.
pub struct NoUsageLedger;

#[async_trait]
impl UsageLedger for NoUsageLedger {
    async fn record(&self, _record: UsageRecord) -> Result<String, LedgerError> {
        Ok(String::new())
    }

    async fn query_stats(&self, _filter: &UsageFilter) -> Result<Vec<UsageStats>, LedgerError> {
        Ok(Vec::new())
    }
}
