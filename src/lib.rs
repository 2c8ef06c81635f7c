//! Steampipe MCP server.
//!
//! Exposes read-only SQL and schema introspection over a Steampipe or plain
//! PostgreSQL database as MCP tools, for use by LLM clients.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::DbError;
pub use mcp::SteampipeService;
