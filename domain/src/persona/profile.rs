//! Role-specific persona settings.
//!
//! Each role carries an explicit, enumerated field set instead of a free-form
//! goals/flags dictionary. The role itself is derived from the variant.

use serde::{Deserialize, Serialize};

/// Role a persona plays in the discussion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaRole {
    Writer,
    Editor,
    Proofreader,
    Mediator,
}

impl PersonaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaRole::Writer => "writer",
            PersonaRole::Editor => "editor",
            PersonaRole::Proofreader => "proofreader",
            PersonaRole::Mediator => "mediator",
        }
    }

    /// Mediators speak once at the end of each round instead of in rotation.
    pub fn is_mediator(&self) -> bool {
        matches!(self, PersonaRole::Mediator)
    }
}

impl std::fmt::Display for PersonaRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PersonaRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "writer" => Ok(PersonaRole::Writer),
            "editor" => Ok(PersonaRole::Editor),
            "proofreader" => Ok(PersonaRole::Proofreader),
            "mediator" => Ok(PersonaRole::Mediator),
            other => Err(format!("unknown persona role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriterFocus {
    #[default]
    Plot,
    Character,
    Worldbuilding,
    Dialogue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorFocus {
    #[default]
    Structure,
    Pacing,
    Consistency,
    Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorRigor {
    Gentle,
    #[default]
    Balanced,
    Rigorous,
}

/// Role-specific settings, tagged by role.
///
/// ```
/// use roundtable_domain::persona::profile::{PersonaRole, RoleProfile};
///
/// let profile: RoleProfile = serde_json::from_str(
///     r#"{"role":"editor","focus":"pacing","rigor":"rigorous"}"#,
/// ).unwrap();
/// assert_eq!(profile.role(), PersonaRole::Editor);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleProfile {
    Writer {
        #[serde(default)]
        focus: WriterFocus,
        /// Offer at least one alternative direction per turn.
        #[serde(default)]
        propose_alternatives: bool,
    },
    Editor {
        #[serde(default)]
        focus: EditorFocus,
        #[serde(default)]
        rigor: EditorRigor,
    },
    Proofreader {
        #[serde(default = "enabled")]
        check_grammar: bool,
        #[serde(default = "enabled")]
        check_style: bool,
        #[serde(default)]
        check_terminology: bool,
    },
    Mediator {
        #[serde(default = "enabled")]
        summarize_each_round: bool,
        /// Ask the room to commit to a `DECISION:` line when positions converge.
        #[serde(default = "enabled")]
        push_for_decision: bool,
    },
}

fn enabled() -> bool {
    true
}

impl RoleProfile {
    pub fn role(&self) -> PersonaRole {
        match self {
            RoleProfile::Writer { .. } => PersonaRole::Writer,
            RoleProfile::Editor { .. } => PersonaRole::Editor,
            RoleProfile::Proofreader { .. } => PersonaRole::Proofreader,
            RoleProfile::Mediator { .. } => PersonaRole::Mediator,
        }
    }

    /// Default settings for a role.
    pub fn for_role(role: PersonaRole) -> Self {
        match role {
            PersonaRole::Writer => RoleProfile::Writer {
                focus: WriterFocus::default(),
                propose_alternatives: false,
            },
            PersonaRole::Editor => RoleProfile::Editor {
                focus: EditorFocus::default(),
                rigor: EditorRigor::default(),
            },
            PersonaRole::Proofreader => RoleProfile::Proofreader {
                check_grammar: true,
                check_style: true,
                check_terminology: false,
            },
            PersonaRole::Mediator => RoleProfile::Mediator {
                summarize_each_round: true,
                push_for_decision: true,
            },
        }
    }

    /// Prompt lines describing these settings.
    pub fn instructions(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match self {
            RoleProfile::Writer {
                focus,
                propose_alternatives,
            } => {
                lines.push(format!(
                    "As the writer, concentrate on {}.",
                    match focus {
                        WriterFocus::Plot => "plot and story beats",
                        WriterFocus::Character => "characters and their motivations",
                        WriterFocus::Worldbuilding => "the setting and its rules",
                        WriterFocus::Dialogue => "voice and dialogue",
                    }
                ));
                if *propose_alternatives {
                    lines.push("Offer at least one alternative direction.".to_string());
                }
            }
            RoleProfile::Editor { focus, rigor } => {
                lines.push(format!(
                    "As the editor, review for {}.",
                    match focus {
                        EditorFocus::Structure => "structure",
                        EditorFocus::Pacing => "pacing",
                        EditorFocus::Consistency => "internal consistency",
                        EditorFocus::Theme => "theme",
                    }
                ));
                lines.push(
                    match rigor {
                        EditorRigor::Gentle => "Keep criticism encouraging.",
                        EditorRigor::Balanced => "Balance praise and critique.",
                        EditorRigor::Rigorous => "Be exacting; flag every weakness.",
                    }
                    .to_string(),
                );
            }
            RoleProfile::Proofreader {
                check_grammar,
                check_style,
                check_terminology,
            } => {
                let mut checks = Vec::new();
                if *check_grammar {
                    checks.push("grammar");
                }
                if *check_style {
                    checks.push("style consistency");
                }
                if *check_terminology {
                    checks.push("terminology");
                }
                if !checks.is_empty() {
                    lines.push(format!("As the proofreader, check {}.", checks.join(" and ")));
                }
            }
            RoleProfile::Mediator {
                summarize_each_round,
                push_for_decision,
            } => {
                if *summarize_each_round {
                    lines.push("Summarize where the room stands after this round.".to_string());
                }
                if *push_for_decision {
                    lines.push(
                        "When the room agrees, state it on its own line as `DECISION: <text>`."
                            .to_string(),
                    );
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_profile() {
        for role in [
            PersonaRole::Writer,
            PersonaRole::Editor,
            PersonaRole::Proofreader,
            PersonaRole::Mediator,
        ] {
            assert_eq!(RoleProfile::for_role(role).role(), role);
        }
    }

    #[test]
    fn test_parse_role() {
        assert_eq!("Mediator".parse::<PersonaRole>(), Ok(PersonaRole::Mediator));
        assert!("narrator".parse::<PersonaRole>().is_err());
    }

    #[test]
    fn test_profile_defaults_on_deserialize() {
        let profile: RoleProfile = serde_json::from_str(r#"{"role":"proofreader"}"#).unwrap();
        assert_eq!(
            profile,
            RoleProfile::Proofreader {
                check_grammar: true,
                check_style: true,
                check_terminology: false,
            }
        );
    }

    #[test]
    fn test_unknown_role_tag_is_rejected() {
        let result: Result<RoleProfile, _> = serde_json::from_str(r#"{"role":"narrator"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_mediator_instructions_mention_decision_marker() {
        let lines = RoleProfile::for_role(PersonaRole::Mediator).instructions();
        assert!(lines.iter().any(|l| l.contains("DECISION:")));
    }

    #[test]
    fn test_proofreader_without_checks_has_no_instructions() {
        let profile = RoleProfile::Proofreader {
            check_grammar: false,
            check_style: false,
            check_terminology: false,
        };
        assert!(profile.instructions().is_empty());
    }
}
