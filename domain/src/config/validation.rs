//! Configuration issues.
//!
//! Loaded configuration is checked as a whole and every problem is returned
//! instead of failing on the first one. Callers decide what to do with
//! warnings; errors mean the offending value is replaced by its default.
//!
//! # Examples
//!
//! ```
//! use roundtable_domain::config::{ConfigIssue, ConfigIssueCode, Severity};
//!
//! let issue = ConfigIssue::error(
//!     ConfigIssueCode::InvalidConstraint,
//!     "discussion.max_rounds must be at least 1",
//! );
//! assert_eq!(issue.severity, Severity::Error);
//! assert!(issue.to_string().starts_with("error:"));
//! ```

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The value cannot be used; the default is substituted.
    Error,
    /// The value is used but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A required string is empty.
    EmptyField,
    /// A string does not name a known variant.
    InvalidEnumValue,
    /// A number is outside its allowed range.
    InvalidConstraint,
    /// Two personas share an id, or a referenced persona is unknown.
    PersonaConflict,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}
