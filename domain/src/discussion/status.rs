//! Discussion lifecycle status

use serde::{Deserialize, Serialize};

/// Lifecycle state of a discussion.
///
/// ```text
/// Created -> Active -> { Paused <-> Active } -> { Completed | Aborted }
/// ```
///
/// `Completed` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionStatus {
    #[default]
    Created,
    Active,
    Paused,
    Completed,
    Aborted,
}

impl DiscussionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscussionStatus::Created => "created",
            DiscussionStatus::Active => "active",
            DiscussionStatus::Paused => "paused",
            DiscussionStatus::Completed => "completed",
            DiscussionStatus::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DiscussionStatus::Completed | DiscussionStatus::Aborted)
    }

    /// Active or Paused: the discussion still occupies its controller.
    pub fn is_live(&self) -> bool {
        matches!(self, DiscussionStatus::Active | DiscussionStatus::Paused)
    }

    /// Whether `self -> next` is an edge of the lifecycle graph.
    ///
    /// A paused discussion may be stopped directly, without resuming first.
    pub fn can_transition_to(&self, next: DiscussionStatus) -> bool {
        use DiscussionStatus::*;
        matches!(
            (self, next),
            (Created, Active)
                | (Created, Aborted)
                | (Active, Paused)
                | (Active, Completed)
                | (Active, Aborted)
                | (Paused, Active)
                | (Paused, Completed)
                | (Paused, Aborted)
        )
    }
}

impl std::fmt::Display for DiscussionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiscussionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(DiscussionStatus::Created),
            "active" => Ok(DiscussionStatus::Active),
            "paused" => Ok(DiscussionStatus::Paused),
            "completed" => Ok(DiscussionStatus::Completed),
            "aborted" => Ok(DiscussionStatus::Aborted),
            other => Err(format!("unknown discussion status '{}'", other)),
        }
    }
}

/// Why a discussion reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    RoundLimit,
    Decision,
    QualityThreshold,
    TimeLimit,
    TokenLimit,
    Stopped,
    AllAgentsFailed,
}

impl CompletionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionReason::RoundLimit => "round_limit",
            CompletionReason::Decision => "decision",
            CompletionReason::QualityThreshold => "quality_threshold",
            CompletionReason::TimeLimit => "time_limit",
            CompletionReason::TokenLimit => "token_limit",
            CompletionReason::Stopped => "stopped",
            CompletionReason::AllAgentsFailed => "all_agents_failed",
        }
    }
}

impl std::fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
