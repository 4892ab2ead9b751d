//! Decision markers in agent messages
//!
//! A line of the form `DECISION: <text>` (any case) records a decision.

use crate::core::ids::{AgentId, MessageId};
use serde::{Deserialize, Serialize};

const MARKER: &str = "decision:";

/// A decision recorded from an agent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub text: String,
    pub proposed_by: AgentId,
    pub message_id: MessageId,
}

/// Extract the text of every decision marker in `content`.
pub fn extract_decisions(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let head = trimmed.get(..MARKER.len())?;
            if !head.eq_ignore_ascii_case(MARKER) {
                return None;
            }
            let text = trimmed[MARKER.len()..].trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .collect()
}
