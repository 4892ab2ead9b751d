//! Summarization engine
//!
//! Compacts a range of older messages into a [`Summary`] with one model
//! call. Choosing the range is the domain's job
//! ([`SummarizationConfig::next_window`]); this use case only performs it.

use crate::config::RuntimeConfig;
use crate::ports::llm_client::{CompletionRequest, LlmClient, LlmError};
use crate::ports::usage_ledger::{NoUsageLedger, UsageLedger};
use crate::use_cases::shared::{CallMeta, OPERATION_SUMMARIZE, record_usage};
use roundtable_domain::{
    Discussion, MessageRange, PromptTemplate, SummarizationConfig, Summary, TokenUsage,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("Summary request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Model returned an empty summary")]
    EmptySummary,

    #[error("Range {range} is outside the {len}-message log")]
    InvalidRange { range: MessageRange, len: usize },
}

/// A produced summary and what it cost.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub summary: Summary,
    pub usage: TokenUsage,
}

pub struct SummarizationEngine {
    client: Arc<dyn LlmClient>,
    ledger: Arc<dyn UsageLedger>,
    runtime: RuntimeConfig,
}

impl SummarizationEngine {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            ledger: Arc::new(NoUsageLedger),
            runtime: RuntimeConfig::default(),
        }
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn UsageLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_runtime_config(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    /// Summarize `range` of `discussion`'s log.
    pub async fn summarize(
        &self,
        discussion: &Discussion,
        range: MessageRange,
        config: &SummarizationConfig,
    ) -> Result<SummaryOutcome, SummarizationError> {
        let len = discussion.messages().len();
        if range.is_empty() || range.end > len {
            return Err(SummarizationError::InvalidRange { range, len });
        }

        let model = config
            .summary_model
            .clone()
            .unwrap_or_else(|| self.runtime.default_model.clone());
        // Words to tokens, with headroom
        let max_tokens = u32::try_from(config.target_length)
            .unwrap_or(u32::MAX)
            .saturating_mul(2)
            .max(64);
        let request = CompletionRequest::new(
            model.clone(),
            PromptTemplate::summary_messages(discussion, range, config.target_length),
            max_tokens,
        );
        let meta = CallMeta {
            provider: self.client.provider(),
            model: &model,
            operation: OPERATION_SUMMARIZE,
            discussion_id: &discussion.id,
            pricing: self.runtime.pricing,
        };

        debug!(discussion = %discussion.id, %range, model = %model, "Summarizing");
        let started = Instant::now();
        let completion = match self.client.complete(request).await {
            Ok(completion) => completion,
            Err(error) => {
                record_usage(self.ledger.as_ref(), meta.failure(&error, started.elapsed())).await;
                return Err(error.into());
            }
        };
        record_usage(
            self.ledger.as_ref(),
            meta.success(&completion.usage, started.elapsed()),
        )
        .await;

        let text = completion.content.trim();
        if text.is_empty() {
            return Err(SummarizationError::EmptySummary);
        }

        info!(
            discussion = %discussion.id,
            %range,
            tokens = completion.usage.total_tokens,
            "Summary created"
        );
        Ok(SummaryOutcome {
            summary: Summary::new(range, text),
            usage: completion.usage,
        })
    }
}
