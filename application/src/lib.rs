//! Application layer for roundtable
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DiscussionOptions, Pricing, RetryAccounting, RuntimeConfig};
pub use ports::{
    clock::{Clock, ManualClock, SystemClock},
    discussion_store::{
        DiscussionFilter, DiscussionRow, DiscussionStore, MessageRow, NoDiscussionStore,
        StoreError,
    },
    events::{
        ChannelSubscriber, DiscussionEvent, EventBus, EventKind, EventSubscriber, SubscriptionId,
    },
    llm_client::{CompletionRequest, ErrorClass, LlmClient, LlmError},
    usage_ledger::{
        LedgerError, NoUsageLedger, UsageFilter, UsageLedger, UsageRecord, UsageStats,
        UsageStatus,
    },
};
pub use use_cases::agent_runtime::{AgentRuntime, AgentTurnError, TurnResult};
pub use use_cases::session_controller::{ControlState, ControllerError, SessionController};
pub use use_cases::summarize::{SummarizationEngine, SummarizationError, SummaryOutcome};
