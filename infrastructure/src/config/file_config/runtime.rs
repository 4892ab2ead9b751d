//! Agent runtime settings from TOML (`[runtime]` and `[retry]` sections)

use roundtable_application::{Pricing, RetryAccounting, RuntimeConfig};
use roundtable_domain::{ConfigIssue, ConfigIssueCode, ExponentialBackoff};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// # Example
///
/// ```toml
/// [runtime]
/// max_tokens = 800
/// context_window = 12
/// retry_accounting = "per_turn"
///
/// [runtime.pricing]
/// prompt_per_1k = 0.15
/// completion_per_1k = 0.6
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRuntimeConfig {
    pub max_tokens: u32,
    pub context_window: usize,
    pub retry_accounting: String,
    pub pricing: Pricing,
}

impl Default for FileRuntimeConfig {
    fn default() -> Self {
        let config = RuntimeConfig::default();
        Self {
            max_tokens: config.max_tokens,
            context_window: config.context_window,
            retry_accounting: config.retry_accounting.as_str().to_string(),
            pricing: config.pricing,
        }
    }
}

impl FileRuntimeConfig {
    /// Convert to [`RuntimeConfig`]. The model comes from `[provider]`.
    pub fn to_runtime_config(&self) -> (RuntimeConfig, Vec<ConfigIssue>) {
        let mut config = RuntimeConfig::default();
        let mut issues = Vec::new();

        if self.max_tokens == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint,
                format!("runtime.max_tokens must be at least 1, using {}", config.max_tokens),
            ));
        } else {
            config.max_tokens = self.max_tokens;
        }

        if self.context_window == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint,
                format!(
                    "runtime.context_window must be at least 1, using {}",
                    config.context_window
                ),
            ));
        } else {
            config.context_window = self.context_window;
        }

        match self.retry_accounting.parse::<RetryAccounting>() {
            Ok(accounting) => config.retry_accounting = accounting,
            Err(e) => issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidEnumValue,
                format!(
                    "runtime.retry_accounting: {}, expected per_attempt or per_turn",
                    e
                ),
            )),
        }

        if self.pricing.prompt_per_1k < 0.0 || self.pricing.completion_per_1k < 0.0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint,
                "runtime.pricing must not be negative, costs will be recorded as 0",
            ));
        } else {
            config.pricing = self.pricing;
        }

        (config, issues)
    }
}

/// Backoff for transient provider failures.
///
/// ```toml
/// [retry]
/// max_retries = 3
/// base_delay_ms = 500
/// factor = 2.0
/// max_delay_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub factor: f64,
    pub max_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let backoff = ExponentialBackoff::default();
        Self {
            max_retries: backoff.max_retries,
            base_delay_ms: backoff.base.as_millis() as u64,
            factor: backoff.factor,
            max_delay_ms: backoff.max_delay.as_millis() as u64,
        }
    }
}

impl FileRetryConfig {
    pub fn to_backoff(&self) -> (ExponentialBackoff, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        if !self.factor.is_finite() || self.factor < 1.0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint,
                format!("retry.factor must be at least 1.0 (got {})", self.factor),
            ));
        }
        if self.max_delay_ms < self.base_delay_ms {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint,
                format!(
                    "retry.max_delay_ms ({}) is below retry.base_delay_ms ({})",
                    self.max_delay_ms, self.base_delay_ms
                ),
            ));
        }
        if !issues.is_empty() {
            return (ExponentialBackoff::default(), issues);
        }

        let backoff = ExponentialBackoff {
            base: Duration::from_millis(self.base_delay_ms),
            factor: self.factor,
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_retries: self.max_retries,
        };
        (backoff, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_defaults_round_trip() {
        let (config, issues) = FileRuntimeConfig::default().to_runtime_config();
        assert!(issues.is_empty());
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_runtime_section_parses() {
        let toml_str = r#"
[runtime]
max_tokens = 800
retry_accounting = "per-turn"

[runtime.pricing]
prompt_per_1k = 0.15
completion_per_1k = 0.6
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let (runtime, issues) = config.runtime.to_runtime_config();
        assert!(issues.is_empty());
        assert_eq!(runtime.max_tokens, 800);
        assert_eq!(runtime.context_window, 20);
        assert_eq!(runtime.retry_accounting, RetryAccounting::PerTurn);
        assert_eq!(runtime.pricing.completion_per_1k, 0.6);
    }

    #[test]
    fn test_unknown_accounting_keeps_default() {
        let config = FileRuntimeConfig {
            retry_accounting: "sometimes".into(),
            ..Default::default()
        };
        let (runtime, issues) = config.to_runtime_config();
        assert_eq!(runtime.retry_accounting, RetryAccounting::PerAttempt);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::InvalidEnumValue);
    }

    #[test]
    fn test_retry_defaults_match_backoff() {
        let (backoff, issues) = FileRetryConfig::default().to_backoff();
        assert!(issues.is_empty());
        assert_eq!(backoff, ExponentialBackoff::default());
    }

    #[test]
    fn test_retry_rejects_shrinking_factor() {
        let config = FileRetryConfig {
            factor: 0.5,
            max_retries: 9,
            ..Default::default()
        };
        let (backoff, issues) = config.to_backoff();
        assert_eq!(issues.len(), 1);
        assert_eq!(backoff.max_retries, 3);
    }
}
