//! Discussion defaults from TOML (`[discussion]` section)

use roundtable_application::DiscussionOptions;
use roundtable_domain::{AgentId, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default options applied to every discussion started from this config.
///
/// # Example
///
/// ```toml
/// [discussion]
/// max_rounds = 4
/// time_limit_seconds = 900
/// auto_stop = true
/// token_limit = 20000
/// participants = ["writer", "editor", "mediator"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    pub max_rounds: u32,
    /// Active-time budget; `0` disables the limit.
    pub time_limit_seconds: u64,
    pub auto_stop: bool,
    pub save_to_database: bool,
    pub human_intervention: bool,
    /// Agent-turn token budget; `0` disables the limit.
    pub token_limit: u64,
    pub stop_on_decision: bool,
    pub quality_threshold: Option<f32>,
    /// Persona ids in speaking order; empty means every persona.
    pub participants: Vec<String>,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        let options = DiscussionOptions::default();
        Self {
            max_rounds: options.max_rounds,
            time_limit_seconds: options.time_limit.map_or(0, |t| t.as_secs()),
            auto_stop: options.auto_stop,
            save_to_database: options.save_to_database,
            human_intervention: options.human_intervention_enabled,
            token_limit: options.token_limit.unwrap_or(0),
            stop_on_decision: options.stop_on_decision,
            quality_threshold: options.quality_threshold,
            participants: Vec::new(),
        }
    }
}

impl FileDiscussionConfig {
    /// Convert to [`DiscussionOptions`], replacing invalid values with
    /// their defaults.
    pub fn to_options(&self) -> (DiscussionOptions, Vec<ConfigIssue>) {
        let defaults = DiscussionOptions::default();
        let mut issues = Vec::new();

        let max_rounds = if self.max_rounds == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint,
                format!(
                    "discussion.max_rounds must be at least 1, using {}",
                    defaults.max_rounds
                ),
            ));
            defaults.max_rounds
        } else {
            self.max_rounds
        };

        let quality_threshold = match self.quality_threshold {
            Some(t) if !(0.0..=1.0).contains(&t) => {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidConstraint,
                    format!(
                        "discussion.quality_threshold must be within 0.0..=1.0 (got {}), ignoring it",
                        t
                    ),
                ));
                None
            }
            other => other,
        };

        let mut participants: Vec<AgentId> = Vec::new();
        for id in &self.participants {
            let id = id.trim();
            if id.is_empty() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::EmptyField,
                    "discussion.participants contains an empty id",
                ));
                continue;
            }
            participants.push(AgentId::new(id));
        }

        let options = DiscussionOptions::default()
            .with_max_rounds(max_rounds)
            .with_time_limit(
                (self.time_limit_seconds > 0).then(|| Duration::from_secs(self.time_limit_seconds)),
            )
            .with_auto_stop(self.auto_stop)
            .with_save_to_database(self.save_to_database)
            .with_human_intervention(self.human_intervention)
            .with_token_limit((self.token_limit > 0).then_some(self.token_limit))
            .with_stop_on_decision(self.stop_on_decision)
            .with_quality_threshold(quality_threshold)
            .with_participants(participants);
        (options, issues)
    }
}
