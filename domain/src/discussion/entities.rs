//! Discussion aggregate root

use super::decision::{Decision, extract_decisions};
use super::message::AgentMessage;
use super::status::{CompletionReason, DiscussionStatus};
use super::summary::{MessageRange, Summary};
use crate::core::error::DomainError;
use crate::core::ids::{AgentId, DiscussionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Optional links to the writing project a discussion belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionScope {
    pub project_id: Option<String>,
    pub plot_id: Option<String>,
    pub chapter_id: Option<String>,
}

/// A round-based conversation among personas (Aggregate Root).
///
/// The message log is append-only and its order is the conversation order.
/// Status moves only along the edges of [`DiscussionStatus::can_transition_to`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub id: DiscussionId,
    pub topic: String,
    pub background: Option<String>,
    pub scope: DiscussionScope,
    status: DiscussionStatus,
    participants: Vec<AgentId>,
    messages: Vec<AgentMessage>,
    summaries: Vec<Summary>,
    pub decisions: Vec<Decision>,
    pub quality_score: Option<f32>,
    pub metadata: Map<String, Value>,
    pub rounds_completed: u32,
    pub completion_reason: Option<CompletionReason>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Discussion {
    pub fn new(topic: impl Into<String>, participants: Vec<AgentId>) -> Self {
        Self {
            id: DiscussionId::generate(),
            topic: topic.into(),
            background: None,
            scope: DiscussionScope::default(),
            status: DiscussionStatus::Created,
            participants,
            messages: Vec::new(),
            summaries: Vec::new(),
            decisions: Vec::new(),
            quality_score: None,
            metadata: Map::new(),
            rounds_completed: 0,
            completion_reason: None,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn with_scope(mut self, scope: DiscussionScope) -> Self {
        self.scope = scope;
        self
    }

    // ==================== Accessors ====================

    pub fn status(&self) -> DiscussionStatus {
        self.status
    }

    pub fn participants(&self) -> &[AgentId] {
        &self.participants
    }

    pub fn messages(&self) -> &[AgentMessage] {
        &self.messages
    }

    pub fn summaries(&self) -> &[Summary] {
        &self.summaries
    }

    /// Index of the first message not covered by any summary.
    pub fn unsummarized_start(&self) -> usize {
        self.summaries.last().map(|s| s.range.end).unwrap_or(0)
    }

    /// Messages after the last summarized index.
    pub fn unsummarized_messages(&self) -> &[AgentMessage] {
        &self.messages[self.unsummarized_start().min(self.messages.len())..]
    }

    pub fn has_decision(&self) -> bool {
        !self.decisions.is_empty()
    }

    // ==================== Mutations ====================

    /// Move to `next`, stamping start/end times.
    pub fn transition(&mut self, next: DiscussionStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        if next == DiscussionStatus::Active && self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        if next.is_terminal() {
            self.ended_at = Some(Utc::now());
        }
        self.status = next;
        Ok(())
    }

    /// Move to a terminal status and record why.
    pub fn finish(
        &mut self,
        status: DiscussionStatus,
        reason: CompletionReason,
    ) -> Result<(), DomainError> {
        if !status.is_terminal() {
            return Err(DomainError::Validation(format!(
                "'{}' is not a terminal status",
                status
            )));
        }
        self.transition(status)?;
        self.completion_reason = Some(reason);
        Ok(())
    }

    /// Append a message, recording any decision markers it carries.
    ///
    /// Returns the number of decisions found in the message.
    pub fn append_message(&mut self, message: AgentMessage) -> Result<usize, DomainError> {
        if !self.status.is_live() {
            return Err(DomainError::NotAcceptingMessages(self.status));
        }
        let found = if message.is_human() {
            0
        } else {
            let texts = extract_decisions(&message.content);
            let count = texts.len();
            self.decisions.extend(texts.into_iter().map(|text| Decision {
                text,
                proposed_by: message.author.clone(),
                message_id: message.id.clone(),
            }));
            count
        };
        self.messages.push(message);
        Ok(found)
    }

    /// Record a summary. Its range must begin at the first unsummarized
    /// index and stay within the log.
    pub fn add_summary(&mut self, summary: Summary) -> Result<(), DomainError> {
        let expected_start = self.unsummarized_start();
        let range = summary.range;
        if range.start != expected_start || range.is_empty() || range.end > self.messages.len() {
            return Err(DomainError::SummaryRange {
                range,
                expected_start,
            });
        }
        self.summaries.push(summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discussion::intervention::HumanIntervention;
    use crate::persona::entities::AgentPersona;
    use crate::persona::profile::{PersonaRole, RoleProfile};

    fn writer() -> AgentPersona {
        AgentPersona::new(
            "writer",
            "Writer",
            RoleProfile::for_role(PersonaRole::Writer),
            "Write.",
        )
    }

    fn active() -> Discussion {
        let mut discussion =
            Discussion::new("World setting", vec![AgentId::new("writer"), AgentId::new("editor")]);
        discussion.transition(DiscussionStatus::Active).unwrap();
        discussion
    }

    #[test]
    fn test_transition_stamps_times() {
        let mut discussion = active();
        assert!(discussion.started_at.is_some());
        assert!(discussion.ended_at.is_none());

        discussion
            .finish(DiscussionStatus::Completed, CompletionReason::RoundLimit)
            .unwrap();
        assert!(discussion.ended_at.is_some());
        assert_eq!(discussion.completion_reason, Some(CompletionReason::RoundLimit));
    }

    #[test]
    fn test_illegal_transition_is_rejected() {
        let mut discussion = active();
        discussion.transition(DiscussionStatus::Aborted).unwrap();
        let err = discussion.transition(DiscussionStatus::Active).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(discussion.status(), DiscussionStatus::Aborted);
    }

    #[test]
    fn test_finish_requires_terminal_status() {
        let mut discussion = active();
        assert!(
            discussion
                .finish(DiscussionStatus::Paused, CompletionReason::Stopped)
                .is_err()
        );
        assert_eq!(discussion.status(), DiscussionStatus::Active);
    }

    #[test]
    fn test_created_discussion_rejects_messages() {
        let mut discussion = Discussion::new("x", vec![]);
        let err = discussion
            .append_message(AgentMessage::from_agent(&writer(), "hi"))
            .unwrap_err();
        assert_eq!(err, DomainError::NotAcceptingMessages(DiscussionStatus::Created));
    }

    #[test]
    fn test_decisions_recorded_from_agent_messages_only() {
        let mut discussion = active();
        let found = discussion
            .append_message(AgentMessage::from_agent(&writer(), "DECISION: two moons"))
            .unwrap();
        assert_eq!(found, 1);

        let human = HumanIntervention::new("DECISION: three moons");
        discussion
            .append_message(AgentMessage::from_intervention(&human))
            .unwrap();

        assert_eq!(discussion.decisions.len(), 1);
        assert_eq!(discussion.decisions[0].text, "two moons");
        assert_eq!(discussion.messages().len(), 2);
    }

    #[test]
    fn test_summaries_must_be_contiguous_and_disjoint() {
        let mut discussion = active();
        for i in 0..6 {
            discussion
                .append_message(AgentMessage::from_agent(&writer(), format!("idea {}", i)))
                .unwrap();
        }

        discussion
            .add_summary(Summary::new(MessageRange::new(0, 3), "first three"))
            .unwrap();
        assert_eq!(discussion.unsummarized_start(), 3);
        assert_eq!(discussion.unsummarized_messages().len(), 3);

        // Re-summarizing covered indices is refused
        let overlap = discussion.add_summary(Summary::new(MessageRange::new(2, 5), "again"));
        assert_eq!(
            overlap,
            Err(DomainError::SummaryRange {
                range: MessageRange::new(2, 5),
                expected_start: 3,
            })
        );

        // So is a range past the end of the log
        assert!(
            discussion
                .add_summary(Summary::new(MessageRange::new(3, 9), "future"))
                .is_err()
        );

        discussion
            .add_summary(Summary::new(MessageRange::new(3, 6), "rest"))
            .unwrap();
        assert!(discussion.unsummarized_messages().is_empty());
    }
}
