//! Stdio transport.
//!
//! JSON-RPC over stdin/stdout, the mode desktop MCP clients use when they
//! spawn the server as a child process.

use crate::db::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::mcp::SteampipeService;
use crate::transport::Transport;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

pub struct StdioTransport {
    connection_manager: Arc<ConnectionManager>,
    query_timeout_secs: u64,
}

impl StdioTransport {
    pub fn new(connection_manager: Arc<ConnectionManager>, query_timeout_secs: u64) -> Self {
        Self {
            connection_manager,
            query_timeout_secs,
        }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Serving MCP over stdio");

        let service =
            SteampipeService::new(self.connection_manager.clone(), self.query_timeout_secs);
        let server = service
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("stdio transport failed to start: {e}")))?;

        tokio::select! {
            outcome = server.waiting() => {
                outcome.map_err(|e| {
                    DbError::internal(format!("stdio transport terminated abnormally: {e}"))
                })?;
                info!("Client closed the stdio session");
                self.connection_manager.close().await;
                Ok(())
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received (repeat to force exit)");
                tokio::spawn(async {
                    shutdown_signal().await;
                    warn!("Second signal, exiting immediately");
                    std::process::exit(1);
                });
                self.connection_manager.close().await;

                // A pending stdin read cannot be cancelled, so once the pool
                // is down the only clean way out is to end the process.
                info!("Exiting");
                std::process::exit(0);
            }
        }
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Resolves on SIGINT or, on unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = signal::ctrl_c() => info!("Received SIGINT"),
            _ = sigterm.recv() => info!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
        info!("Received SIGINT");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transport_reports_its_name() {
        let pool = sqlx::PgPool::connect_lazy("postgresql://localhost/test").unwrap();
        let manager = Arc::new(ConnectionManager::from_pool(pool));
        assert_eq!(StdioTransport::new(manager, 30).name(), "stdio");
    }
}
