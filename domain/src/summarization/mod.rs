//! History summarization settings and window selection

pub mod config;

pub use config::SummarizationConfig;
