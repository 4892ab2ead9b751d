//! Domain layer for roundtable
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Discussion
//!
//! A round-based conversation among LLM-backed personas about one topic.
//! The [`Discussion`] aggregate owns the append-only message log, the
//! summaries that compact its older part, and the lifecycle status:
//!
//! ```text
//! Created -> Active -> { Paused <-> Active } -> { Completed | Aborted }
//! ```
//!
//! ## Personas
//!
//! Writer, editor, proofreader and mediator personas, each with a
//! role-specific [`RoleProfile`]. Mediators speak at the end of every round.
//!
//! ## Policies
//!
//! The [`TurnScheduler`], [`BudgetMonitor`], summarization window selection,
//! retry backoff and quality scoring are pure and clock-free; the
//! application layer drives them.

pub mod budget;
pub mod config;
pub mod core;
pub mod discussion;
pub mod llm;
pub mod persona;
pub mod policy;
pub mod prompt;
pub mod scheduling;
pub mod summarization;
pub mod util;

// Re-export commonly used types
pub use budget::{BudgetCause, BudgetLimits, BudgetMonitor, TokenUsageStats};
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::{
    error::DomainError,
    ids::{AgentId, DiscussionId, InterventionId, MessageId},
    model::Model,
};
pub use discussion::{
    decision::{Decision, extract_decisions},
    entities::{Discussion, DiscussionScope},
    intervention::{HumanIntervention, ImpactLevel},
    message::{AgentMessage, MessageMetadata, MessageRole},
    report::DiscussionReport,
    status::{CompletionReason, DiscussionStatus},
    summary::{MessageRange, Summary},
};
pub use llm::{
    chat::{ChatMessage, ChatRole},
    completion::{Completion, FinishReason, TokenUsage},
};
pub use persona::{
    entities::{AgentPersona, PersonalityTraits, Tone},
    profile::{EditorFocus, EditorRigor, PersonaRole, RoleProfile, WriterFocus},
};
pub use policy::{
    DecisionCoverageScorer, ExponentialBackoff, NoQualityScore, NoRetry, QualityScorer,
    RetryPolicy,
};
pub use prompt::PromptTemplate;
pub use scheduling::TurnScheduler;
pub use summarization::SummarizationConfig;
