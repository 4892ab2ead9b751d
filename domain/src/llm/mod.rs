//! Value objects exchanged with language-model providers

pub mod chat;
pub mod completion;
