//! Tools domain module.
//!
//! Tools are the functions MCP clients call; each one maps onto one or a few
//! Frappe REST calls.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations, grouped by area
//! - `handlers.rs` - Tool output and the type-erased handler trait
//! - `registry.rs` - Central tool registry, validation and dispatch
//! - `router.rs` - rmcp ToolRouter built from the registry
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create the params struct and a unit struct implementing `ToolDefinition`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in `ToolRegistry::new`
//!
//! The router and both transports pick it up from the registry.

pub mod definitions;
mod error;
mod handlers;
mod registry;
pub mod router;

pub use error::ToolError;
pub use handlers::{ToolHandler, ToolOutput, TypedHandler};
pub use registry::ToolRegistry;
pub use router::build_tool_router;
