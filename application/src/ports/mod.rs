//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod clock;
pub mod discussion_store;
pub mod events;
pub mod llm_client;
pub mod usage_ledger;
