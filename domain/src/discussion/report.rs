//! End-of-discussion report

use super::entities::Discussion;
use super::status::{CompletionReason, DiscussionStatus};
use crate::budget::monitor::TokenUsageStats;
use crate::core::ids::DiscussionId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome snapshot carried by the terminal discussion events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionReport {
    pub discussion_id: DiscussionId,
    pub topic: String,
    pub status: DiscussionStatus,
    pub reason: Option<CompletionReason>,
    pub rounds_completed: u32,
    pub message_count: usize,
    pub human_message_count: usize,
    pub summary_count: usize,
    pub decisions: Vec<String>,
    pub quality_score: Option<f32>,
    pub token_usage: TokenUsageStats,
    pub elapsed_ms: u64,
}

impl DiscussionReport {
    pub fn from_discussion(
        discussion: &Discussion,
        token_usage: TokenUsageStats,
        elapsed: Duration,
    ) -> Self {
        Self {
            discussion_id: discussion.id.clone(),
            topic: discussion.topic.clone(),
            status: discussion.status(),
            reason: discussion.completion_reason,
            rounds_completed: discussion.rounds_completed,
            message_count: discussion.messages().len(),
            human_message_count: discussion.messages().iter().filter(|m| m.is_human()).count(),
            summary_count: discussion.summaries().len(),
            decisions: discussion.decisions.iter().map(|d| d.text.clone()).collect(),
            quality_score: discussion.quality_score,
            token_usage,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}
