//! Core value objects shared across the domain.

pub mod error;
pub mod ids;
pub mod model;
