//! Round-robin turn scheduler
//!
//! Participants speak in insertion order. Mediators are held back and speak
//! once at the end of every round, after all rotation participants. Human
//! interventions are merged by the session loop before it asks for a
//! speaker, so they never consume a slot here.

use crate::core::ids::AgentId;
use crate::discussion::status::CompletionReason;
use crate::persona::entities::AgentPersona;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone)]
pub struct TurnScheduler {
    rotation: Vec<AgentId>,
    mediators: Vec<AgentId>,
    disabled: HashSet<AgentId>,
    /// Slots still to run in the current round, front is next.
    pending: VecDeque<AgentId>,
    round: u32,
    max_rounds: u32,
    stop_on_decision: bool,
}

impl TurnScheduler {
    /// Build a schedule for the given participants.
    ///
    /// When every participant is a mediator they are treated as an
    /// ordinary rotation.
    pub fn new<'a>(participants: impl IntoIterator<Item = &'a AgentPersona>, max_rounds: u32) -> Self {
        let (mut rotation, mut mediators) = (Vec::new(), Vec::new());
        for persona in participants {
            if persona.role().is_mediator() {
                mediators.push(persona.id.clone());
            } else {
                rotation.push(persona.id.clone());
            }
        }
        if rotation.is_empty() {
            rotation = std::mem::take(&mut mediators);
        }

        let mut scheduler = Self {
            rotation,
            mediators,
            disabled: HashSet::new(),
            pending: VecDeque::new(),
            round: 0,
            max_rounds,
            stop_on_decision: true,
        };
        scheduler.refill();
        scheduler
    }

    pub fn with_stop_on_decision(mut self, enabled: bool) -> Self {
        self.stop_on_decision = enabled;
        self
    }

    // ==================== Accessors ====================

    /// Completed rounds so far.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn is_disabled(&self, agent: &AgentId) -> bool {
        self.disabled.contains(agent)
    }

    /// Whether at least one rotation participant can still speak.
    pub fn has_rotation_participants(&self) -> bool {
        self.rotation.iter().any(|id| !self.disabled.contains(id))
    }

    // ==================== Scheduling ====================

    /// The participant whose slot is next, or `None` when nobody is left.
    pub fn next_speaker(&self) -> Option<&AgentId> {
        self.pending.front()
    }

    /// Consume the current slot, whatever its outcome.
    ///
    /// Returns `true` when this slot finished a round.
    pub fn complete_turn(&mut self) -> bool {
        self.pending.pop_front();
        self.drop_disabled();
        if self.pending.is_empty() {
            self.round += 1;
            self.refill();
            true
        } else {
            false
        }
    }

    /// Exclude an agent from all later slots.
    ///
    /// Call before [`complete_turn`](Self::complete_turn) when disabling the
    /// agent that currently holds the slot.
    pub fn disable(&mut self, agent: &AgentId) {
        self.disabled.insert(agent.clone());
    }

    /// Why the discussion should end now, if it should.
    pub fn should_stop(&self, decision_recorded: bool) -> Option<CompletionReason> {
        if self.round >= self.max_rounds {
            Some(CompletionReason::RoundLimit)
        } else if self.stop_on_decision && decision_recorded {
            Some(CompletionReason::Decision)
        } else {
            None
        }
    }

    fn refill(&mut self) {
        self.pending = self
            .rotation
            .iter()
            .chain(self.mediators.iter())
            .filter(|id| !self.disabled.contains(*id))
            .cloned()
            .collect();
    }

    fn drop_disabled(&mut self) {
        let disabled = &self.disabled;
        self.pending.retain(|id| !disabled.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::profile::{PersonaRole, RoleProfile};

    fn persona(id: &str, role: PersonaRole) -> AgentPersona {
        AgentPersona::new(id, id, RoleProfile::for_role(role), "prompt")
    }

    fn room() -> Vec<AgentPersona> {
        vec![
            persona("mediator", PersonaRole::Mediator),
            persona("writer", PersonaRole::Writer),
            persona("editor", PersonaRole::Editor),
        ]
    }

    /// Run slots until `rounds` rounds have completed, collecting speakers.
    fn run(scheduler: &mut TurnScheduler, rounds: u32) -> Vec<String> {
        let mut spoken = Vec::new();
        while scheduler.round() < rounds {
            let Some(id) = scheduler.next_speaker() else { break };
            spoken.push(id.to_string());
            scheduler.complete_turn();
        }
        spoken
    }

    #[test]
    fn test_mediator_speaks_last_each_round() {
        let personas = room();
        let mut scheduler = TurnScheduler::new(&personas, 2);
        assert_eq!(
            run(&mut scheduler, 2),
            vec!["writer", "editor", "mediator", "writer", "editor", "mediator"]
        );
    }

    #[test]
    fn test_round_completes_after_mediator_slot() {
        let personas = room();
        let mut scheduler = TurnScheduler::new(&personas, 3);
        assert!(!scheduler.complete_turn()); // writer
        assert!(!scheduler.complete_turn()); // editor
        assert_eq!(scheduler.round(), 0);
        assert!(scheduler.complete_turn()); // mediator
        assert_eq!(scheduler.round(), 1);
        assert_eq!(scheduler.next_speaker().map(|a| a.as_str()), Some("writer"));
    }

    #[test]
    fn test_round_limit_stops() {
        let personas = vec![
            persona("a", PersonaRole::Writer),
            persona("b", PersonaRole::Editor),
        ];
        let mut scheduler = TurnScheduler::new(&personas, 3);
        let spoken = run(&mut scheduler, 3);
        assert_eq!(spoken.len(), 6);
        assert_eq!(scheduler.should_stop(false), Some(CompletionReason::RoundLimit));
    }

    #[test]
    fn test_decision_stops_unless_disabled() {
        let personas = room();
        let scheduler = TurnScheduler::new(&personas, 5);
        assert_eq!(scheduler.should_stop(false), None);
        assert_eq!(scheduler.should_stop(true), Some(CompletionReason::Decision));

        let scheduler = TurnScheduler::new(&personas, 5).with_stop_on_decision(false);
        assert_eq!(scheduler.should_stop(true), None);
    }

    #[test]
    fn test_disabled_agent_is_skipped() {
        let personas = room();
        let mut scheduler = TurnScheduler::new(&personas, 3);

        // writer fails fatally on its first slot
        let writer = scheduler.next_speaker().cloned().unwrap();
        scheduler.disable(&writer);
        scheduler.complete_turn();

        let spoken = run(&mut scheduler, 2);
        assert_eq!(spoken, vec!["editor", "mediator", "editor", "mediator"]);
        assert!(scheduler.has_rotation_participants());
    }

    #[test]
    fn test_disabling_last_slot_of_round_finishes_round() {
        let personas = room();
        let mut scheduler = TurnScheduler::new(&personas, 3);
        scheduler.complete_turn(); // writer
        scheduler.disable(&AgentId::new("mediator"));
        // editor's slot is now the last one left in the round
        assert!(scheduler.complete_turn());
        assert_eq!(scheduler.round(), 1);
    }

    #[test]
    fn test_no_rotation_left_after_all_disabled() {
        let personas = room();
        let mut scheduler = TurnScheduler::new(&personas, 3);
        scheduler.disable(&AgentId::new("writer"));
        scheduler.disable(&AgentId::new("editor"));
        assert!(!scheduler.has_rotation_participants());
    }

    #[test]
    fn test_mediator_only_room_rotates() {
        let personas = vec![
            persona("m1", PersonaRole::Mediator),
            persona("m2", PersonaRole::Mediator),
        ];
        let mut scheduler = TurnScheduler::new(&personas, 1);
        assert!(scheduler.has_rotation_participants());
        assert_eq!(run(&mut scheduler, 1), vec!["m1", "m2"]);
    }
}
