//! Presentation layer for roundtable
//!
//! This crate contains the CLI definition, the console event presenter and
//! the interactive control prompt.

pub mod cli;
pub mod control;
pub mod output;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use control::{ControlCommand, apply, run_control_prompt};
pub use output::console::{ConsolePresenter, format_duration};
