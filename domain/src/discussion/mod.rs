//! Discussion aggregate and its value objects

pub mod decision;
pub mod entities;
pub mod intervention;
pub mod message;
pub mod report;
pub mod status;
pub mod summary;
