//! Messages in the discussion log

use crate::core::ids::{AgentId, MessageId};
use crate::llm::completion::TokenUsage;
use crate::persona::entities::AgentPersona;
use crate::persona::profile::PersonaRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::intervention::HumanIntervention;

/// Author id used for messages that came from a human intervention.
pub const HUMAN_AUTHOR_ID: &str = "human";

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    Writer,
    Editor,
    Proofreader,
    Mediator,
    Human,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::Writer => "writer",
            MessageRole::Editor => "editor",
            MessageRole::Proofreader => "proofreader",
            MessageRole::Mediator => "mediator",
            MessageRole::Human => "human",
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, MessageRole::Human)
    }
}

impl From<PersonaRole> for MessageRole {
    fn from(role: PersonaRole) -> Self {
        match role {
            PersonaRole::Writer => MessageRole::Writer,
            PersonaRole::Editor => MessageRole::Editor,
            PersonaRole::Proofreader => MessageRole::Proofreader,
            PersonaRole::Mediator => MessageRole::Mediator,
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional annotations attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotional_tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

/// One entry of the discussion log. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: MessageId,
    pub author: AgentId,
    pub author_name: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl AgentMessage {
    /// Message produced by a persona's turn.
    pub fn from_agent(persona: &AgentPersona, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            author: persona.id.clone(),
            author_name: persona.name.clone(),
            role: persona.role().into(),
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    /// Message converted from a dequeued human intervention.
    pub fn from_intervention(intervention: &HumanIntervention) -> Self {
        Self {
            id: MessageId::generate(),
            author: AgentId::new(HUMAN_AUTHOR_ID),
            author_name: "Human".to_string(),
            role: MessageRole::Human,
            content: intervention.content.clone(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_human(&self) -> bool {
        self.role.is_human()
    }

    pub fn token_usage(&self) -> Option<&TokenUsage> {
        self.metadata.as_ref().and_then(|m| m.token_usage.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::profile::RoleProfile;

    #[test]
    fn test_agent_message_takes_persona_role() {
        let persona = AgentPersona::new(
            "mira",
            "Mira",
            RoleProfile::for_role(PersonaRole::Mediator),
            "Moderate.",
        );
        let message = AgentMessage::from_agent(&persona, "Let's settle the prologue.");
        assert_eq!(message.role, MessageRole::Mediator);
        assert_eq!(message.author.as_str(), "mira");
        assert!(!message.is_human());
    }

    #[test]
    fn test_intervention_becomes_human_message() {
        let intervention = HumanIntervention::new("consider a twist ending");
        let message = AgentMessage::from_intervention(&intervention);
        assert!(message.is_human());
        assert_eq!(message.author.as_str(), HUMAN_AUTHOR_ID);
        assert_eq!(message.content, "consider a twist ending");
    }

    #[test]
    fn test_metadata_is_omitted_when_absent() {
        let intervention = HumanIntervention::new("hi");
        let json = serde_json::to_value(AgentMessage::from_intervention(&intervention)).unwrap();
        assert!(json.get("metadata").is_none());
        assert_eq!(json["role"], "human");
    }
}
