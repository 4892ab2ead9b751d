//! Agent runtime
//!
//! Turns one persona and the current discussion into a single model call,
//! retrying transient failures and reporting every call to the usage ledger.

use crate::config::{RetryAccounting, RuntimeConfig};
use crate::ports::llm_client::{CompletionRequest, LlmClient, LlmError};
use crate::ports::usage_ledger::{NoUsageLedger, UsageLedger};
use crate::use_cases::shared::{CallMeta, OPERATION_TURN, record_usage};
use roundtable_domain::{
    AgentPersona, Discussion, ExponentialBackoff, FinishReason, PromptTemplate, RetryPolicy,
    TokenUsage,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A successful turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub content: String,
    pub usage: TokenUsage,
    pub finish_reason: FinishReason,
    /// Calls made, including the successful one.
    pub attempts: u32,
    /// Wall time across all attempts and backoff waits.
    pub duration: Duration,
}

/// A failed turn.
#[derive(Error, Debug)]
pub enum AgentTurnError {
    /// Transient failures outlasted the retry policy. The turn is skipped.
    #[error("Turn degraded after {attempts} attempt(s): {source}")]
    Degraded { attempts: u32, source: LlmError },

    /// The agent cannot take further turns.
    #[error("Agent disabled: {reason}")]
    Fatal { reason: String },
}

impl AgentTurnError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, AgentTurnError::Fatal { .. })
    }
}

/// Produces agent turns against an [`LlmClient`].
pub struct AgentRuntime {
    client: Arc<dyn LlmClient>,
    ledger: Arc<dyn UsageLedger>,
    retry_policy: Arc<dyn RetryPolicy>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            ledger: Arc::new(NoUsageLedger),
            retry_policy: Arc::new(ExponentialBackoff::default()),
            config: RuntimeConfig::default(),
        }
    }

    pub fn with_ledger(mut self, ledger: Arc<dyn UsageLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<dyn LlmClient> {
        &self.client
    }

    pub fn ledger(&self) -> &Arc<dyn UsageLedger> {
        &self.ledger
    }

    /// Produce `persona`'s next contribution to `discussion`.
    pub async fn produce_turn(
        &self,
        persona: &AgentPersona,
        discussion: &Discussion,
    ) -> Result<TurnResult, AgentTurnError> {
        persona
            .validate()
            .map_err(|e| AgentTurnError::Fatal {
                reason: e.to_string(),
            })?;

        let model = persona
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());
        let request = CompletionRequest::new(
            model.clone(),
            PromptTemplate::turn_messages(persona, discussion, self.config.context_window),
            self.config.max_tokens,
        );
        let meta = CallMeta {
            provider: self.client.provider(),
            model: &model,
            operation: OPERATION_TURN,
            discussion_id: &discussion.id,
            pricing: self.config.pricing,
        };
        let per_attempt = self.config.retry_accounting == RetryAccounting::PerAttempt;

        let turn_started = Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let attempt_started = Instant::now();
            debug!(agent = %persona.id, attempt = attempts, model = %model, "Requesting turn");

            match self.client.complete(request.clone()).await {
                Ok(completion) => {
                    let duration = turn_started.elapsed();
                    let recorded = if per_attempt {
                        attempt_started.elapsed()
                    } else {
                        duration
                    };
                    record_usage(self.ledger.as_ref(), meta.success(&completion.usage, recorded))
                        .await;

                    return Ok(TurnResult {
                        content: completion.content,
                        usage: completion.usage,
                        finish_reason: completion.finish_reason,
                        attempts,
                        duration,
                    });
                }
                Err(error) => {
                    if per_attempt {
                        record_usage(
                            self.ledger.as_ref(),
                            meta.failure(&error, attempt_started.elapsed()),
                        )
                        .await;
                    }

                    let retries_used = attempts - 1;
                    if error.is_transient() && retries_used < self.retry_policy.max_retries() {
                        let delay = self
                            .retry_policy
                            .delay_for(retries_used + 1)
                            .max(error.retry_after().unwrap_or_default());
                        warn!(
                            agent = %persona.id,
                            attempt = attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "Transient model error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if !per_attempt {
                        record_usage(
                            self.ledger.as_ref(),
                            meta.failure(&error, turn_started.elapsed()),
                        )
                        .await;
                    }

                    return Err(if error.is_transient() {
                        AgentTurnError::Degraded {
                            attempts,
                            source: error,
                        }
                    } else {
                        AgentTurnError::Fatal {
                            reason: error.to_string(),
                        }
                    });
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Port doubles shared by the use case tests.

    use crate::ports::llm_client::{CompletionRequest, LlmClient, LlmError};
    use crate::ports::usage_ledger::{
        LedgerError, UsageFilter, UsageLedger, UsageRecord, UsageStats,
    };
    use async_trait::async_trait;
    use roundtable_domain::{Completion, TokenUsage};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// A scripted reply for [`ScriptedClient`]
    #[derive(Debug, Clone)]
    pub enum Scripted {
        Reply(String, TokenUsage),
        Fail(LlmError),
        /// Wait until [`ScriptedClient::release`] is called, then reply.
        Gated(String, TokenUsage),
        /// Sleep (tokio time) and then reply.
        Slow(Duration, String, TokenUsage),
    }

    pub fn reply(text: &str) -> Scripted {
        Scripted::Reply(text.to_string(), TokenUsage::new(10, 5))
    }

    /// Client that answers from a script, falling back to a numbered reply.
    pub struct ScriptedClient {
        script: Mutex<VecDeque<Scripted>>,
        requests: Mutex<Vec<CompletionRequest>>,
        gate: Notify,
    }

    impl ScriptedClient {
        pub fn new(script: Vec<Scripted>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
                gate: Notify::new(),
            }
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn release(&self) {
            self.gate.notify_one();
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        fn provider(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
            let call = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(request);
                requests.len()
            };
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Scripted::Reply(text, usage)) => Ok(Completion::new(text, usage)),
                Some(Scripted::Fail(error)) => Err(error),
                Some(Scripted::Gated(text, usage)) => {
                    self.gate.notified().await;
                    Ok(Completion::new(text, usage))
                }
                Some(Scripted::Slow(delay, text, usage)) => {
                    tokio::time::sleep(delay).await;
                    Ok(Completion::new(text, usage))
                }
                None => Ok(Completion::new(
                    format!("reply {}", call),
                    TokenUsage::new(10, 5),
                )),
            }
        }
    }

    /// Ledger that keeps every record; can be told to fail.
    #[derive(Default)]
    pub struct RecordingLedger {
        pub records: Mutex<Vec<UsageRecord>>,
        pub fail: bool,
    }

    impl RecordingLedger {
        pub fn failing() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn records(&self) -> Vec<UsageRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UsageLedger for RecordingLedger {
        async fn record(&self, record: UsageRecord) -> Result<String, LedgerError> {
            if self.fail {
                return Err(LedgerError::Unavailable("offline".to_string()));
            }
            let mut records = self.records.lock().unwrap();
            records.push(record);
            Ok(format!("usage-{}", records.len()))
        }

        async fn query_stats(&self, _filter: &UsageFilter) -> Result<Vec<UsageStats>, LedgerError> {
            Ok(Vec::new())
        }
    }
}
