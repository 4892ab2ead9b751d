//! Persona definitions from TOML (`[[personas]]` array)

use roundtable_domain::{
    AgentPersona, ConfigIssue, ConfigIssueCode, Model, PersonaRole, PersonalityTraits,
    RoleProfile, Tone,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One persona.
///
/// # Example
///
/// ```toml
/// [[personas]]
/// id = "aoi"
/// name = "Aoi"
/// role = "writer"
/// tone = "warm"
/// system_prompt = "You write quiet literary fiction."
/// goals = ["Keep the heroine's voice consistent"]
///
/// [personas.traits]
/// creativity = 0.8
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePersonaConfig {
    pub id: String,
    pub name: String,
    pub role: String,
    pub tone: Option<String>,
    pub system_prompt: String,
    pub goals: Vec<String>,
    pub constraints: Vec<String>,
    pub model: Option<String>,
    pub traits: Option<PersonalityTraits>,
}

impl FilePersonaConfig {
    /// Build the persona, or `None` (with an error issue) when it cannot
    /// be used at all.
    pub fn to_persona(&self) -> (Option<AgentPersona>, Vec<ConfigIssue>) {
        let label = if self.id.trim().is_empty() {
            "<unnamed>"
        } else {
            self.id.trim()
        };
        let mut issues = Vec::new();

        let role = match self.role.parse::<PersonaRole>() {
            Ok(role) => role,
            Err(e) => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue,
                    format!(
                        "personas.{}.role: {} (expected writer, editor, proofreader or mediator)",
                        label, e
                    ),
                ));
                return (None, issues);
            }
        };

        let mut persona = AgentPersona::new(
            self.id.trim(),
            self.name.trim(),
            RoleProfile::for_role(role),
            self.system_prompt.trim(),
        )
        .with_goals(self.goals.clone())
        .with_constraints(self.constraints.clone());

        if let Some(tone) = &self.tone {
            match tone.parse::<Tone>() {
                Ok(tone) => persona = persona.with_tone(tone),
                Err(e) => issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue,
                    format!("personas.{}.tone: {}, using neutral", label, e),
                )),
            }
        }
        if let Some(traits) = self.traits {
            persona = persona.with_traits(traits);
        }
        if let Some(model) = self.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            persona = persona.with_model(Model::new(model));
        }

        if let Err(e) = persona.validate() {
            issues.push(ConfigIssue::error(ConfigIssueCode::EmptyField, e.to_string()));
            return (None, issues);
        }
        (Some(persona), issues)
    }
}

/// Build every configured persona, dropping unusable and duplicate
/// entries. Falls back to [`AgentPersona::default_set`] when none are
/// configured.
pub fn build_personas(configs: &[FilePersonaConfig]) -> (Vec<AgentPersona>, Vec<ConfigIssue>) {
    if configs.is_empty() {
        return (AgentPersona::default_set(), vec![]);
    }

    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    let mut personas = Vec::new();
    for config in configs {
        let (persona, persona_issues) = config.to_persona();
        issues.extend(persona_issues);
        let Some(persona) = persona else { continue };
        if !seen.insert(persona.id.clone()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::PersonaConflict,
                format!("personas: duplicate id '{}', keeping the first", persona.id),
            ));
            continue;
        }
        personas.push(persona);
    }
    (personas, issues)
}
