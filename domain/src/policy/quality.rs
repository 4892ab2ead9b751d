//! Discussion quality scoring
//!
//! A score in `0.0..=1.0` checked at the end of each round. Used for
//! auto-stop only when a threshold is configured.

use crate::discussion::entities::Discussion;
use std::collections::HashSet;

pub trait QualityScorer: Send + Sync + std::fmt::Debug {
    /// Score the discussion so far, or `None` when it cannot be judged yet.
    fn score(&self, discussion: &Discussion) -> Option<f32>;
}

/// Never produces a score; quality auto-stop stays off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQualityScore;

impl QualityScorer for NoQualityScore {
    fn score(&self, _discussion: &Discussion) -> Option<f32> {
        None
    }
}

/// Scores by recorded decisions and how many participants have spoken.
///
/// `score = decision_weight * min(decisions / target_decisions, 1)
///        + (1 - decision_weight) * spoken_participants / participants`
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionCoverageScorer {
    pub target_decisions: usize,
    pub decision_weight: f32,
}

impl Default for DecisionCoverageScorer {
    fn default() -> Self {
        Self {
            target_decisions: 3,
            decision_weight: 0.7,
        }
    }
}

impl QualityScorer for DecisionCoverageScorer {
    fn score(&self, discussion: &Discussion) -> Option<f32> {
        let participants = discussion.participants();
        if participants.is_empty() || discussion.messages().iter().all(|m| m.is_human()) {
            return None;
        }

        let decisions = if self.target_decisions == 0 {
            1.0
        } else {
            (discussion.decisions.len() as f32 / self.target_decisions as f32).min(1.0)
        };

        let spoken: HashSet<_> = discussion
            .messages()
            .iter()
            .filter(|m| !m.is_human())
            .map(|m| &m.author)
            .collect();
        let coverage = participants.iter().filter(|p| spoken.contains(p)).count() as f32
            / participants.len() as f32;

        let weight = self.decision_weight.clamp(0.0, 1.0);
        Some(weight * decisions + (1.0 - weight) * coverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::AgentId;
    use crate::discussion::message::AgentMessage;
    use crate::discussion::status::DiscussionStatus;
    use crate::persona::entities::AgentPersona;
    use crate::persona::profile::{PersonaRole, RoleProfile};

    fn persona(id: &str) -> AgentPersona {
        AgentPersona::new(id, id, RoleProfile::for_role(PersonaRole::Writer), "p")
    }

    fn discussion() -> Discussion {
        let mut discussion = Discussion::new("t", vec![AgentId::new("a"), AgentId::new("b")]);
        discussion.transition(DiscussionStatus::Active).unwrap();
        discussion
    }

    #[test]
    fn test_no_score_before_anyone_speaks() {
        assert_eq!(DecisionCoverageScorer::default().score(&discussion()), None);
        assert_eq!(NoQualityScore.score(&discussion()), None);
    }

    #[test]
    fn test_score_combines_decisions_and_coverage() {
        let scorer = DecisionCoverageScorer {
            target_decisions: 2,
            decision_weight: 0.5,
        };
        let mut discussion = discussion();
        discussion
            .append_message(AgentMessage::from_agent(&persona("a"), "DECISION: rainy city"))
            .unwrap();

        // one of two decisions, one of two speakers
        let score = scorer.score(&discussion).unwrap();
        assert!((score - 0.5).abs() < f32::EPSILON);

        discussion
            .append_message(AgentMessage::from_agent(&persona("b"), "DECISION: no magic"))
            .unwrap();
        let score = scorer.score(&discussion).unwrap();
        assert!((score - 1.0).abs() < f32::EPSILON);
    }
}
