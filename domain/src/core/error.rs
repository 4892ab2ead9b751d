//! Domain error types

use crate::discussion::status::DiscussionStatus;
use crate::discussion::summary::MessageRange;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: DiscussionStatus,
        to: DiscussionStatus,
    },

    #[error("Summary range {range} must start at message index {expected_start}")]
    SummaryRange {
        range: MessageRange,
        expected_start: usize,
    },

    #[error("Discussion is {0} and cannot accept messages")]
    NotAcceptingMessages(DiscussionStatus),
}

impl DomainError {
    /// Check if this error came from input validation
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }
}
