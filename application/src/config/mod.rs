//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`DiscussionOptions`]: per-discussion budgets and switches
//! - [`RuntimeConfig`]: model defaults, prompt window, usage accounting

pub mod discussion_options;
pub mod runtime;

pub use discussion_options::DiscussionOptions;
pub use runtime::{Pricing, RetryAccounting, RuntimeConfig};
