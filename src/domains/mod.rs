//! Domains module containing business logic organized by bounded contexts.
//!
//! - `frappe`: everything that talks to the Frappe backend
//! - `tools`: the MCP tool surface built on top of it

pub mod frappe;
pub mod tools;
