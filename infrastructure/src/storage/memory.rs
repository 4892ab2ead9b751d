//! Process-local discussion store

use async_trait::async_trait;
use chrono::Utc;
use roundtable_application::{
    DiscussionFilter, DiscussionRow, DiscussionStore, MessageRow, StoreError,
};
use roundtable_domain::DiscussionStatus;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    /// Insertion order
    discussions: Vec<DiscussionRow>,
    messages: HashMap<String, Vec<MessageRow>>,
}

/// Keeps discussion and message rows in memory.
#[derive(Default)]
pub struct InMemoryDiscussionStore {
    tables: RwLock<Tables>,
}

impl InMemoryDiscussionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DiscussionStore for InMemoryDiscussionStore {
    async fn save_discussion(&self, row: DiscussionRow) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.discussions.iter_mut().find(|d| d.id == row.id) {
            Some(existing) => *existing = row,
            None => tables.discussions.push(row),
        }
        Ok(())
    }

    async fn update_status(
        &self,
        discussion_id: &str,
        status: DiscussionStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .discussions
            .iter_mut()
            .find(|d| d.id == discussion_id)
            .ok_or_else(|| StoreError::NotFound(discussion_id.to_string()))?;
        row.status = status;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn append_message(&self, row: MessageRow) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let discussion = tables
            .discussions
            .iter_mut()
            .find(|d| d.id == row.discussion_id)
            .ok_or_else(|| StoreError::NotFound(row.discussion_id.clone()))?;
        discussion.updated_at = Utc::now();
        tables
            .messages
            .entry(row.discussion_id.clone())
            .or_default()
            .push(row);
        Ok(())
    }

    async fn list_discussions(
        &self,
        filter: &DiscussionFilter,
    ) -> Result<Vec<DiscussionRow>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .discussions
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn recent_discussions(&self, limit: usize) -> Result<Vec<DiscussionRow>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows = tables.discussions.clone();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn messages(&self, discussion_id: &str) -> Result<Vec<MessageRow>, StoreError> {
        let tables = self.tables.read().await;
        if !tables.discussions.iter().any(|d| d.id == discussion_id) {
            return Err(StoreError::NotFound(discussion_id.to_string()));
        }
        Ok(tables.messages.get(discussion_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use roundtable_domain::{
        AgentId, AgentMessage, AgentPersona, Discussion, DiscussionScope, HumanIntervention,
        PersonaRole, RoleProfile,
    };

    fn discussion(topic: &str, project: Option<&str>) -> Discussion {
        Discussion::new(topic, vec![AgentId::new("writer"), AgentId::new("editor")]).with_scope(
            DiscussionScope {
                project_id: project.map(str::to_string),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_messages_kept_in_order_with_type() {
        let store = InMemoryDiscussionStore::new();
        let d = discussion("Setting", None);
        store
            .save_discussion(DiscussionRow::from_discussion(&d))
            .await
            .unwrap();

        let writer = AgentPersona::new(
            "writer",
            "Writer",
            RoleProfile::for_role(PersonaRole::Writer),
            "p",
        );
        let id = d.id.as_str();
        store
            .append_message(MessageRow::from_message(id, &AgentMessage::from_agent(&writer, "An island")))
            .await
            .unwrap();
        store
            .append_message(MessageRow::from_message(
                id,
                &AgentMessage::from_intervention(&HumanIntervention::new("Make it colder")),
            ))
            .await
            .unwrap();

        let rows = store.messages(id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].message_type, "agent");
        assert_eq!(rows[0].agent_role, "writer");
        assert_eq!(rows[1].message_type, "human");
        assert_eq!(rows[1].message, "Make it colder");
    }

    #[tokio::test]
    async fn test_unknown_discussion_is_not_found() {
        let store = InMemoryDiscussionStore::new();
        assert!(matches!(
            store.update_status("nope", DiscussionStatus::Active).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.messages("nope").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_filter_by_project_and_status() {
        let store = InMemoryDiscussionStore::new();
        let a = discussion("a", Some("p1"));
        let b = discussion("b", Some("p2"));
        for d in [&a, &b] {
            store
                .save_discussion(DiscussionRow::from_discussion(d))
                .await
                .unwrap();
        }
        store
            .update_status(a.id.as_str(), DiscussionStatus::Completed)
            .await
            .unwrap();

        let p1 = DiscussionFilter {
            project_id: Some("p1".to_string()),
            ..Default::default()
        };
        let rows = store.list_discussions(&p1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DiscussionStatus::Completed);

        let created = DiscussionFilter {
            status: Some(DiscussionStatus::Created),
            ..Default::default()
        };
        let rows = store.list_discussions(&created).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].topic, "b");
    }

    #[tokio::test]
    async fn test_recent_orders_by_update_time() {
        let store = InMemoryDiscussionStore::new();
        let now = Utc::now();
        for (topic, age) in [("old", 60), ("new", 1), ("mid", 30)] {
            let mut row = DiscussionRow::from_discussion(&discussion(topic, None));
            row.updated_at = now - Duration::minutes(age);
            store.save_discussion(row).await.unwrap();
        }

        let recent = store.recent_discussions(2).await.unwrap();
        let topics: Vec<&str> = recent.iter().map(|r| r.topic.as_str()).collect();
        assert_eq!(topics, vec!["new", "mid"]);
    }
}
