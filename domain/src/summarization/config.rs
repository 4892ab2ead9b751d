//! Summarization configuration

use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::discussion::entities::Discussion;
use crate::discussion::summary::MessageRange;
use serde::{Deserialize, Serialize};

/// When and how to compact older messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationConfig {
    /// Summarize once more than this many messages are unsummarized.
    /// Also the size of each summarized window.
    pub threshold: usize,
    /// Target summary length, in words.
    pub target_length: usize,
    /// Model used for summaries; the runtime default when `None`.
    pub summary_model: Option<Model>,
    pub enabled: bool,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            threshold: 10,
            target_length: 200,
            summary_model: None,
            enabled: true,
        }
    }
}

impl SummarizationConfig {
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_summary_model(mut self, model: Model) -> Self {
        self.summary_model = Some(model);
        self
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.threshold == 0 {
            return Err(DomainError::Validation(
                "summarization threshold must be at least 1".to_string(),
            ));
        }
        if self.target_length == 0 {
            return Err(DomainError::Validation(
                "summary target length must be at least 1".to_string(),
            ));
        }
        if self.summary_model.as_ref().is_some_and(Model::is_blank) {
            return Err(DomainError::Validation(
                "summary model name is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The range to summarize next, if the unsummarized tail has grown past
    /// the threshold: the oldest `threshold` unsummarized messages.
    pub fn next_window(&self, discussion: &Discussion) -> Option<MessageRange> {
        if !self.enabled || self.threshold == 0 {
            return None;
        }
        let start = discussion.unsummarized_start();
        let tail = discussion.messages().len().saturating_sub(start);
        (tail > self.threshold).then(|| MessageRange::new(start, start + self.threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::AgentId;
    use crate::discussion::message::AgentMessage;
    use crate::discussion::status::DiscussionStatus;
    use crate::discussion::summary::Summary;
    use crate::persona::entities::AgentPersona;
    use crate::persona::profile::{PersonaRole, RoleProfile};

    fn discussion_with(count: usize) -> Discussion {
        let persona = AgentPersona::new(
            "writer",
            "Writer",
            RoleProfile::for_role(PersonaRole::Writer),
            "Write.",
        );
        let mut discussion = Discussion::new("topic", vec![AgentId::new("writer")]);
        discussion.transition(DiscussionStatus::Active).unwrap();
        for i in 0..count {
            discussion
                .append_message(AgentMessage::from_agent(&persona, format!("m{}", i)))
                .unwrap();
        }
        discussion
    }

    #[test]
    fn test_no_window_at_threshold() {
        let config = SummarizationConfig::default().with_threshold(10);
        assert_eq!(config.next_window(&discussion_with(10)), None);
    }

    #[test]
    fn test_window_is_oldest_threshold_messages() {
        let config = SummarizationConfig::default().with_threshold(10);
        let mut discussion = discussion_with(11);
        assert_eq!(config.next_window(&discussion), Some(MessageRange::new(0, 10)));

        discussion
            .add_summary(Summary::new(MessageRange::new(0, 10), "s"))
            .unwrap();
        // One unsummarized message left; nothing to do
        assert_eq!(config.next_window(&discussion), None);
    }

    #[test]
    fn test_disabled_never_selects() {
        assert_eq!(
            SummarizationConfig::disabled().next_window(&discussion_with(50)),
            None
        );
    }

    #[test]
    fn test_validate() {
        assert!(SummarizationConfig::default().validate().is_ok());
        assert!(SummarizationConfig::default().with_threshold(0).validate().is_err());
        assert!(
            SummarizationConfig::default()
                .with_summary_model(Model::new(" "))
                .validate()
                .is_err()
        );
    }
}
