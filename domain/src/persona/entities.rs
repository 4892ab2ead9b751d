//! Agent persona entity

use super::profile::{PersonaRole, RoleProfile};
use crate::core::error::DomainError;
use crate::core::ids::AgentId;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Speaking tone of a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Warm,
    #[default]
    Neutral,
    Direct,
    Playful,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Warm => "warm",
            Tone::Neutral => "neutral",
            Tone::Direct => "direct",
            Tone::Playful => "playful",
        }
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warm" => Ok(Tone::Warm),
            "neutral" => Ok(Tone::Neutral),
            "direct" => Ok(Tone::Direct),
            "playful" => Ok(Tone::Playful),
            other => Err(format!("unknown tone '{}'", other)),
        }
    }
}

/// Personality dials, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityTraits {
    pub creativity: f32,
    pub strictness: f32,
    pub verbosity: f32,
}

impl Default for PersonalityTraits {
    fn default() -> Self {
        Self {
            creativity: 0.5,
            strictness: 0.5,
            verbosity: 0.5,
        }
    }
}

impl PersonalityTraits {
    fn describe(value: f32, low: &str, mid: &str, high: &str) -> String {
        if value < 0.34 {
            low.to_string()
        } else if value < 0.67 {
            mid.to_string()
        } else {
            high.to_string()
        }
    }

    /// One sentence for the system prompt.
    pub fn describe_all(&self) -> String {
        format!(
            "You are {}, {} and {}.",
            Self::describe(self.creativity, "conventional", "imaginative", "boldly inventive"),
            Self::describe(self.strictness, "easygoing", "fair-minded", "uncompromising"),
            Self::describe(self.verbosity, "brief", "measured", "expansive"),
        )
    }
}

/// A configured discussion participant (Entity).
///
/// Immutable for the lifetime of a discussion; shared by reference
/// (`Arc<AgentPersona>`) between the registry, scheduler and runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPersona {
    pub id: AgentId,
    pub name: String,
    pub profile: RoleProfile,
    #[serde(default)]
    pub traits: PersonalityTraits,
    #[serde(default)]
    pub tone: Tone,
    pub system_prompt: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    /// Model override; the runtime default is used when `None`.
    #[serde(default)]
    pub model: Option<Model>,
}

impl AgentPersona {
    pub fn new(
        id: impl Into<AgentId>,
        name: impl Into<String>,
        profile: RoleProfile,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            profile,
            traits: PersonalityTraits::default(),
            tone: Tone::default(),
            system_prompt: system_prompt.into(),
            goals: Vec::new(),
            constraints: Vec::new(),
            model: None,
        }
    }

    pub fn role(&self) -> PersonaRole {
        self.profile.role()
    }

    pub fn with_traits(mut self, traits: PersonalityTraits) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_goals(mut self, goals: Vec<String>) -> Self {
        self.goals = goals;
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<String>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Validate this persona, collecting every problem found.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut problems = Vec::new();
        if self.id.as_str().trim().is_empty() {
            problems.push("id is empty".to_string());
        }
        if self.name.trim().is_empty() {
            problems.push("name is empty".to_string());
        }
        if self.system_prompt.trim().is_empty() {
            problems.push("system prompt is empty".to_string());
        }
        for (label, value) in [
            ("creativity", self.traits.creativity),
            ("strictness", self.traits.strictness),
            ("verbosity", self.traits.verbosity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                problems.push(format!("{} must be within 0.0..=1.0 (got {})", label, value));
            }
        }
        if let Some(model) = &self.model
            && model.is_blank()
        {
            problems.push("model name is empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "persona '{}': {}",
                self.id,
                problems.join("; ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> AgentPersona {
        AgentPersona::new(
            "editor",
            "Edith",
            RoleProfile::for_role(PersonaRole::Editor),
            "You edit fiction.",
        )
    }

    #[test]
    fn test_valid_persona() {
        assert!(editor().validate().is_ok());
        assert_eq!(editor().role(), PersonaRole::Editor);
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let persona = AgentPersona::new(
            "x",
            " ",
            RoleProfile::for_role(PersonaRole::Writer),
            "",
        )
        .with_traits(PersonalityTraits {
            creativity: 1.5,
            ..Default::default()
        });

        let err = persona.validate().unwrap_err().to_string();
        assert!(err.contains("name is empty"));
        assert!(err.contains("system prompt is empty"));
        assert!(err.contains("creativity"));
    }

    #[test]
    fn test_blank_model_override_is_invalid() {
        let persona = editor().with_model(Model::new(""));
        assert!(persona.validate().is_err());
    }

    #[test]
    fn test_traits_description() {
        let traits = PersonalityTraits {
            creativity: 0.9,
            strictness: 0.1,
            verbosity: 0.5,
        };
        assert_eq!(
            traits.describe_all(),
            "You are boldly inventive, easygoing and measured."
        );
    }

    #[test]
    fn test_deserialize_persona_with_defaults() {
        let json = r#"{
            "id": "mira",
            "name": "Mira",
            "profile": {"role": "mediator"},
            "system_prompt": "You keep the room on track."
        }"#;
        let persona: AgentPersona = serde_json::from_str(json).unwrap();
        assert_eq!(persona.role(), PersonaRole::Mediator);
        assert_eq!(persona.tone, Tone::Neutral);
        assert!(persona.model.is_none());
    }
}
