//! Time and token budgets

pub mod monitor;

pub use monitor::{BudgetCause, BudgetLimits, BudgetMonitor, TokenUsageStats};
