//! Provider settings from TOML (`[provider]` section)

use roundtable_domain::{ConfigIssue, ConfigIssueCode, Model};
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completions endpoint.
///
/// # Example
///
/// ```toml
/// [provider]
/// base_url = "http://localhost:11434/v1"
/// api_key_env = "OLLAMA_API_KEY"
/// model = "llama3.1"
/// timeout_seconds = 120
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Label used in usage records.
    pub name: String,
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Default model for personas without an override.
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            name: "openai".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            model: Model::DEFAULT.to_string(),
            timeout_seconds: 60,
        }
    }
}

impl FileProviderConfig {
    /// The key from `api_key`, or else from the `api_key_env` variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn parse_model(&self) -> (Model, Vec<ConfigIssue>) {
        let model = Model::new(self.model.trim());
        if model.is_blank() {
            return (
                Model::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::EmptyField,
                    format!("provider.model is empty, using {}", Model::DEFAULT),
                )],
            );
        }
        (model, vec![])
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_model().1;
        if self.base_url.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyField,
                "provider.base_url is empty",
            ));
        }
        if self.timeout_seconds == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint,
                "provider.timeout_seconds is 0, requests will use the client default",
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_key_wins_over_env() {
        let config = FileProviderConfig {
            api_key: Some("sk-inline".into()),
            api_key_env: "ROUNDTABLE_TEST_UNSET_KEY".into(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-inline"));
    }

    #[test]
    fn test_missing_key_is_none() {
        let config = FileProviderConfig {
            api_key_env: "ROUNDTABLE_TEST_UNSET_KEY".into(),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
    }

    #[test]
    fn test_blank_model_falls_back() {
        let config = FileProviderConfig {
            model: "  ".into(),
            ..Default::default()
        };
        let (model, issues) = config.parse_model();
        assert_eq!(model, Model::default());
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_empty_base_url_is_error() {
        let config = FileProviderConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(config.validate().iter().any(|i| i.is_error()));
    }
}
