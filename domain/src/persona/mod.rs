//! Agent personas.
//!
//! - [`entities::AgentPersona`]: immutable persona configuration
//! - [`profile::RoleProfile`]: validated, role-specific settings
//! - [`defaults`]: the built-in writing room

pub mod defaults;
pub mod entities;
pub mod profile;
