//! Per-discussion loop control options.
//!
//! [`DiscussionOptions`] is passed to
//! [`SessionController::start_discussion`](crate::use_cases::session_controller::SessionController::start_discussion)
//! and fixed for the lifetime of that discussion.

use roundtable_domain::{AgentId, BudgetLimits, DiscussionScope};
use std::time::Duration;

/// Budgets and switches for one discussion.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscussionOptions {
    /// Rounds before the discussion completes naturally.
    pub max_rounds: u32,
    /// Active-time budget; paused time does not count.
    pub time_limit: Option<Duration>,
    /// Complete the discussion when a budget runs out, instead of warning.
    pub auto_stop: bool,
    /// Persist discussion and message rows through the store port.
    pub save_to_database: bool,
    pub human_intervention_enabled: bool,
    /// Agent-turn token budget; [`Self::DEFAULT_TOKEN_LIMIT`] unless set.
    pub token_limit: Option<u64>,
    /// Complete once any agent records a `DECISION:` line.
    pub stop_on_decision: bool,
    /// Auto-stop when the quality score at a round end reaches this.
    pub quality_threshold: Option<f32>,
    /// Participants in speaking order; every registered persona when empty.
    pub participant_ids: Vec<AgentId>,
    pub scope: DiscussionScope,
}

impl Default for DiscussionOptions {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            time_limit: Some(Duration::from_secs(30 * 60)),
            auto_stop: true,
            save_to_database: true,
            human_intervention_enabled: true,
            token_limit: Some(Self::DEFAULT_TOKEN_LIMIT),
            stop_on_decision: true,
            quality_threshold: None,
            participant_ids: Vec::new(),
            scope: DiscussionScope::default(),
        }
    }
}

impl DiscussionOptions {
    /// Token ceiling applied when the caller does not choose one.
    pub const DEFAULT_TOKEN_LIMIT: u64 = 200_000;

    // ==================== Builder Methods ====================

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn with_auto_stop(mut self, enabled: bool) -> Self {
        self.auto_stop = enabled;
        self
    }

    pub fn with_token_limit(mut self, limit: Option<u64>) -> Self {
        self.token_limit = limit;
        self
    }

    pub fn with_stop_on_decision(mut self, enabled: bool) -> Self {
        self.stop_on_decision = enabled;
        self
    }

    pub fn with_quality_threshold(mut self, threshold: Option<f32>) -> Self {
        self.quality_threshold = threshold;
        self
    }

    pub fn with_participants(mut self, ids: Vec<AgentId>) -> Self {
        self.participant_ids = ids;
        self
    }

    pub fn with_human_intervention(mut self, enabled: bool) -> Self {
        self.human_intervention_enabled = enabled;
        self
    }

    pub fn with_save_to_database(mut self, enabled: bool) -> Self {
        self.save_to_database = enabled;
        self
    }

    pub fn with_scope(mut self, scope: DiscussionScope) -> Self {
        self.scope = scope;
        self
    }

    // ==================== Derived ====================

    pub fn budget_limits(&self) -> BudgetLimits {
        BudgetLimits {
            time_limit: self.time_limit,
            token_limit: self.token_limit,
        }
    }

    /// Check ranges, reporting the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rounds == 0 {
            return Err("max_rounds must be at least 1".to_string());
        }
        if self.time_limit.is_some_and(|t| t.is_zero()) {
            return Err("time_limit must be greater than zero".to_string());
        }
        if self.token_limit == Some(0) {
            return Err("token_limit must be greater than zero".to_string());
        }
        if let Some(threshold) = self.quality_threshold
            && !(0.0..=1.0).contains(&threshold)
        {
            return Err(format!(
                "quality_threshold must be within 0.0..=1.0 (got {})",
                threshold
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let options = DiscussionOptions::default();
        assert_eq!(options.max_rounds, 5);
        assert!(options.auto_stop);
        assert!(options.human_intervention_enabled);
        assert!(options.participant_ids.is_empty());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_token_ceiling_applies_by_default() {
        let limits = DiscussionOptions::default().budget_limits();
        assert_eq!(limits.token_limit, Some(DiscussionOptions::DEFAULT_TOKEN_LIMIT));

        let unlimited = DiscussionOptions::default().with_token_limit(None);
        assert_eq!(unlimited.budget_limits().token_limit, None);
    }

    #[test]
    fn test_builder_and_limits() {
        let options = DiscussionOptions::default()
            .with_max_rounds(3)
            .with_time_limit(Some(Duration::from_secs(60)))
            .with_token_limit(Some(5_000));

        let limits = options.budget_limits();
        assert_eq!(limits.time_limit, Some(Duration::from_secs(60)));
        assert_eq!(limits.token_limit, Some(5_000));
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        assert!(DiscussionOptions::default().with_max_rounds(0).validate().is_err());
        assert!(
            DiscussionOptions::default()
                .with_time_limit(Some(Duration::ZERO))
                .validate()
                .is_err()
        );
        assert!(
            DiscussionOptions::default()
                .with_quality_threshold(Some(1.5))
                .validate()
                .is_err()
        );
    }
}
