//! Frappe MCP Server Library
//!
//! This crate exposes a Frappe / ERPNext site to Model Context Protocol
//! clients as a fixed set of document and schema tools.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **frappe**: REST client, authentication coordinator, filter
//!     normalization and the document/schema operations
//!   - **tools**: tool definitions, registry and dispatch
//!
//! # Example
//!
//! ```rust,no_run
//! use frappe_mcp_server::{core::McpServer, core::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
