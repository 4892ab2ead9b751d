//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent_runtime;
pub mod session_controller;
pub(crate) mod shared;
pub mod summarize;
