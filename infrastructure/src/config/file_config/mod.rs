//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Each section converts itself into the application or domain type and
//! reports what it had to replace along the way.

mod discussion;
mod logging;
mod personas;
mod provider;
mod runtime;
mod summarization;

pub use discussion::FileDiscussionConfig;
pub use logging::FileLoggingConfig;
pub use personas::{FilePersonaConfig, build_personas};
pub use provider::FileProviderConfig;
pub use runtime::{FileRetryConfig, FileRuntimeConfig};
pub use summarization::FileSummarizationConfig;

use roundtable_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Defaults for every discussion
    pub discussion: FileDiscussionConfig,
    /// History compaction
    pub summarization: FileSummarizationConfig,
    /// Prompt window, token caps, usage accounting
    pub runtime: FileRuntimeConfig,
    /// Backoff for transient provider failures
    pub retry: FileRetryConfig,
    /// LLM endpoint
    pub provider: FileProviderConfig,
    pub logging: FileLoggingConfig,
    /// The room; the built-in personas when empty
    pub personas: Vec<FilePersonaConfig>,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.discussion.to_options().1);
        issues.extend(self.summarization.to_config().1);
        issues.extend(self.runtime.to_runtime_config().1);
        issues.extend(self.retry.to_backoff().1);
        issues.extend(self.provider.validate());

        let (personas, persona_issues) = build_personas(&self.personas);
        issues.extend(persona_issues);

        // Participants must name a usable persona
        let known: HashSet<&str> = personas.iter().map(|p| p.id.as_str()).collect();
        for id in &self.discussion.participants {
            let id = id.trim();
            if !id.is_empty() && !known.contains(id) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::PersonaConflict,
                    format!("discussion.participants: unknown persona '{}'", id),
                ));
            }
        }

        issues
    }
}
