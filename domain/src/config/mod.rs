//! Configuration value objects for the domain layer
//!
//! Structured issues reported when loaded configuration is checked.

mod validation;

pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
