//! Human interventions

use crate::core::ids::InterventionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How strongly the human wants the intervention weighed. Reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Low => "low",
            ImpactLevel::Medium => "medium",
            ImpactLevel::High => "high",
        }
    }
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImpactLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ImpactLevel::Low),
            "medium" => Ok(ImpactLevel::Medium),
            "high" => Ok(ImpactLevel::High),
            other => Err(format!("unknown impact level '{}'", other)),
        }
    }
}

/// Human input waiting to be merged into the discussion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanIntervention {
    pub id: InterventionId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub impact: ImpactLevel,
}

impl HumanIntervention {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: InterventionId::generate(),
            content: content.into(),
            timestamp: Utc::now(),
            impact: ImpactLevel::default(),
        }
    }

    pub fn with_impact(mut self, impact: ImpactLevel) -> Self {
        self.impact = impact;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_defaults_to_medium() {
        assert_eq!(HumanIntervention::new("x").impact, ImpactLevel::Medium);
        assert_eq!(
            HumanIntervention::new("x").with_impact(ImpactLevel::High).impact,
            ImpactLevel::High
        );
    }

    #[test]
    fn test_parse_impact() {
        assert_eq!("HIGH".parse::<ImpactLevel>(), Ok(ImpactLevel::High));
        assert!("urgent".parse::<ImpactLevel>().is_err());
    }
}
