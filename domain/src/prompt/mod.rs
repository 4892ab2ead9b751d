//! Prompt domain
//!
//! Builds the chat messages sent for an agent turn and for a history summary.

mod template;

pub use template::PromptTemplate;
