//! Built-in personas for a writing room.

use super::entities::{AgentPersona, PersonalityTraits, Tone};
use super::profile::{EditorFocus, EditorRigor, PersonaRole, RoleProfile, WriterFocus};

impl AgentPersona {
    /// The default room: writer, editor, proofreader and mediator.
    pub fn default_set() -> Vec<AgentPersona> {
        vec![
            AgentPersona::new(
                "writer",
                "Writer",
                RoleProfile::Writer {
                    focus: WriterFocus::Plot,
                    propose_alternatives: true,
                },
                "You are a novelist brainstorming with colleagues. Propose concrete story \
                 ideas, scenes and developments, and build on what others have said.",
            )
            .with_traits(PersonalityTraits {
                creativity: 0.9,
                strictness: 0.3,
                verbosity: 0.6,
            })
            .with_tone(Tone::Playful),
            AgentPersona::new(
                "editor",
                "Editor",
                RoleProfile::Editor {
                    focus: EditorFocus::Structure,
                    rigor: EditorRigor::Balanced,
                },
                "You are a developmental editor. Evaluate proposals for coherence, \
                 structure and reader engagement, and suggest improvements.",
            )
            .with_traits(PersonalityTraits {
                creativity: 0.4,
                strictness: 0.7,
                verbosity: 0.5,
            })
            .with_tone(Tone::Direct),
            AgentPersona::new(
                "proofreader",
                "Proofreader",
                RoleProfile::for_role(PersonaRole::Proofreader),
                "You are a meticulous proofreader. Point out inconsistencies in names, \
                 timeline, terminology and style in what has been proposed.",
            )
            .with_traits(PersonalityTraits {
                creativity: 0.2,
                strictness: 0.9,
                verbosity: 0.3,
            }),
            AgentPersona::new(
                "mediator",
                "Mediator",
                RoleProfile::for_role(PersonaRole::Mediator),
                "You moderate a writers' room. Summarize positions, resolve disagreements \
                 and steer the group toward decisions.",
            )
            .with_tone(Tone::Warm),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_is_valid_and_covers_roles() {
        let personas = AgentPersona::default_set();
        assert_eq!(personas.len(), 4);
        assert!(personas.iter().all(|p| p.validate().is_ok()));
        assert_eq!(
            personas.iter().filter(|p| p.role().is_mediator()).count(),
            1
        );
    }
}
