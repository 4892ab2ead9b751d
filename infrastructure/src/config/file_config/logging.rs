//! Logging settings from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving every discussion event.
    pub event_log: Option<PathBuf>,
    /// Directory for daily-rotated tracing output.
    pub log_dir: Option<PathBuf>,
}
