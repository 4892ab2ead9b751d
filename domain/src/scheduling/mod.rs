//! Speaking order

pub mod scheduler;

pub use scheduler::TurnScheduler;
