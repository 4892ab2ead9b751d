//! Model value object representing an LLM model identifier

use serde::{Deserialize, Serialize};

/// LLM model identifier (Value Object)
///
/// Providers accept free-form model names, so this is a thin wrapper
/// rather than a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(String);

impl Model {
    pub const DEFAULT: &'static str = "gpt-4o-mini";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the name is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model() {
        assert_eq!(Model::default().as_str(), "gpt-4o-mini");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let model: Model = "  claude-sonnet  ".parse().unwrap();
        assert_eq!(model.as_str(), "claude-sonnet");
        assert!(!model.is_blank());
        assert!(Model::new(" ").is_blank());
    }
}
