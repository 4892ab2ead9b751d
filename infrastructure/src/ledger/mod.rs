//! Usage ledger adapters

mod memory;

pub use memory::InMemoryUsageLedger;
