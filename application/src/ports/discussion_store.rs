//! Discussion persistence port
//!
//! Rows mirror the relational schema the desktop app uses. Writes are
//! append-on-message and update-on-status-change.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roundtable_domain::{AgentMessage, Discussion, DiscussionStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Discussion not found: {0}")]
    NotFound(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Stored discussion header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionRow {
    pub id: String,
    pub project_id: Option<String>,
    pub plot_id: Option<String>,
    pub chapter_id: Option<String>,
    pub topic: String,
    pub status: DiscussionStatus,
    pub thread_id: Option<String>,
    /// JSON array of participant ids.
    pub participants: Value,
    /// JSON object of free-form metadata.
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiscussionRow {
    pub fn from_discussion(discussion: &Discussion) -> Self {
        let participants = discussion
            .participants()
            .iter()
            .map(|id| Value::String(id.to_string()))
            .collect();
        Self {
            id: discussion.id.to_string(),
            project_id: discussion.scope.project_id.clone(),
            plot_id: discussion.scope.plot_id.clone(),
            chapter_id: discussion.scope.chapter_id.clone(),
            topic: discussion.topic.clone(),
            status: discussion.status(),
            thread_id: None,
            participants: Value::Array(participants),
            metadata: Value::Object(discussion.metadata.clone()),
            created_at: discussion.created_at,
            updated_at: Utc::now(),
        }
    }
}

/// Stored message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub discussion_id: String,
    pub agent_role: String,
    pub agent_name: String,
    pub message: String,
    /// `"agent"` or `"human"`.
    pub message_type: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl MessageRow {
    pub fn from_message(discussion_id: &str, message: &AgentMessage) -> Self {
        let metadata = message
            .metadata
            .as_ref()
            .and_then(|m| serde_json::to_value(m).ok())
            .unwrap_or(Value::Null);
        Self {
            id: message.id.to_string(),
            discussion_id: discussion_id.to_string(),
            agent_role: message.role.as_str().to_string(),
            agent_name: message.author_name.clone(),
            message: message.content.clone(),
            message_type: if message.is_human() { "human" } else { "agent" }.to_string(),
            metadata,
            created_at: message.timestamp,
        }
    }
}

/// Filter for listing stored discussions. Empty fields match all.
#[derive(Debug, Clone, Default)]
pub struct DiscussionFilter {
    pub project_id: Option<String>,
    pub plot_id: Option<String>,
    pub status: Option<DiscussionStatus>,
}

impl DiscussionFilter {
    pub fn matches(&self, row: &DiscussionRow) -> bool {
        self.project_id
            .as_ref()
            .is_none_or(|p| row.project_id.as_ref() == Some(p))
            && self
                .plot_id
                .as_ref()
                .is_none_or(|p| row.plot_id.as_ref() == Some(p))
            && self.status.is_none_or(|s| row.status == s)
    }
}

/// Port for persisting discussions.
#[async_trait]
pub trait DiscussionStore: Send + Sync {
    /// Insert or replace the discussion header.
    async fn save_discussion(&self, row: DiscussionRow) -> Result<(), StoreError>;

    async fn update_status(
        &self,
        discussion_id: &str,
        status: DiscussionStatus,
    ) -> Result<(), StoreError>;

    async fn append_message(&self, row: MessageRow) -> Result<(), StoreError>;

    async fn list_discussions(
        &self,
        filter: &DiscussionFilter,
    ) -> Result<Vec<DiscussionRow>, StoreError>;

    /// Most recently updated first.
    async fn recent_discussions(&self, limit: usize) -> Result<Vec<DiscussionRow>, StoreError>;

    /// Messages of one discussion in log order.
    async fn messages(&self, discussion_id: &str) -> Result<Vec<MessageRow>, StoreError>;
}

/// Store that keeps nothing; used when saving is disabled.
pub struct NoDiscussionStore;

#[async_trait]
impl DiscussionStore for NoDiscussionStore {
    async fn save_discussion(&self, _row: DiscussionRow) -> Result<(), StoreError> {
        Ok(())
    }

    async fn update_status(
        &self,
        _discussion_id: &str,
        _status: DiscussionStatus,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn append_message(&self, _row: MessageRow) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_discussions(
        &self,
        _filter: &DiscussionFilter,
    ) -> Result<Vec<DiscussionRow>, StoreError> {
        Ok(Vec::new())
    }

    async fn recent_discussions(&self, _limit: usize) -> Result<Vec<DiscussionRow>, StoreError> {
        Ok(Vec::new())
    }

    async fn messages(&self, _discussion_id: &str) -> Result<Vec<MessageRow>, StoreError> {
        Ok(Vec::new())
    }
}
