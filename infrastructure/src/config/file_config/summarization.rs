//! Summarization settings from TOML (`[summarization]` section)

use roundtable_domain::{ConfigIssue, ConfigIssueCode, Model, SummarizationConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSummarizationConfig {
    pub enabled: bool,
    pub threshold: usize,
    /// Words.
    pub target_length: usize,
    pub summary_model: Option<String>,
}

impl Default for FileSummarizationConfig {
    fn default() -> Self {
        let config = SummarizationConfig::default();
        Self {
            enabled: config.enabled,
            threshold: config.threshold,
            target_length: config.target_length,
            summary_model: None,
        }
    }
}

impl FileSummarizationConfig {
    pub fn to_config(&self) -> (SummarizationConfig, Vec<ConfigIssue>) {
        let defaults = SummarizationConfig::default();
        let mut issues = Vec::new();
        let mut config = SummarizationConfig {
            enabled: self.enabled,
            ..SummarizationConfig::default()
        };

        if self.threshold == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint,
                format!(
                    "summarization.threshold must be at least 1, using {}",
                    defaults.threshold
                ),
            ));
        } else {
            config.threshold = self.threshold;
        }

        if self.target_length == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint,
                format!(
                    "summarization.target_length must be at least 1, using {}",
                    defaults.target_length
                ),
            ));
        } else {
            config.target_length = self.target_length;
        }

        match self.summary_model.as_deref().map(str::trim) {
            Some("") => issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyField,
                "summarization.summary_model is empty, using the runtime default model",
            )),
            Some(name) => config.summary_model = Some(Model::new(name)),
            None => {}
        }

        (config, issues)
    }
}
