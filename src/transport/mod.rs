//! MCP transports.
//!
//! Two ways for a client to reach the tool dispatcher: stdio (the default,
//! used by desktop MCP clients that spawn the server as a child process) and
//! streamable HTTP. Both own the shutdown path for their mode and close the
//! connection pool before returning.

pub mod http;
pub mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

use crate::error::DbResult;
use std::future::Future;

/// A transport serves the MCP protocol until the client goes away or the
/// process is told to stop.
pub trait Transport: Send + Sync {
    /// Serve until shutdown. Resolves only when the transport is done.
    fn run(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Short transport name for logs.
    fn name(&self) -> &'static str;
}
