//! Logging infrastructure: structured event logging.
//!
//! Provides [`JsonlEventLogger`], a JSONL file writer that subscribes to the
//! [`EventBus`](roundtable_application::EventBus).

mod jsonl_logger;

pub use jsonl_logger::JsonlEventLogger;
