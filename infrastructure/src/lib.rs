//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod ledger;
pub mod llm;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileDiscussionConfig, FileLoggingConfig, FilePersonaConfig,
    FileProviderConfig, FileRetryConfig, FileRuntimeConfig, FileSummarizationConfig,
    build_personas,
};
pub use ledger::InMemoryUsageLedger;
pub use llm::{OpenAiCompatibleClient, OpenAiError};
pub use logging::JsonlEventLogger;
pub use storage::InMemoryDiscussionStore;
