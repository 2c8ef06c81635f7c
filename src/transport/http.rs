//! Streamable-HTTP transport.
//!
//! Mounts rmcp's `StreamableHttpService` on an axum router. Each HTTP
//! session gets its own service instance; they all share one connection
//! manager, so the pool bounds apply across sessions.

use crate::db::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::mcp::SteampipeService;
use crate::transport::Transport;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// Open SSE streams can hold the server up forever; stop draining after this
/// long (or on a second signal).
const DRAIN_WINDOW: Duration = Duration::from_secs(30);

pub struct HttpTransport {
    connection_manager: Arc<ConnectionManager>,
    query_timeout_secs: u64,
    host: String,
    port: u16,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(
        connection_manager: Arc<ConnectionManager>,
        query_timeout_secs: u64,
        host: impl Into<String>,
        port: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            connection_manager,
            query_timeout_secs,
            host: host.into(),
            port,
            endpoint: endpoint.into(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Router with the MCP service mounted at the configured path.
    fn router(&self) -> axum::Router {
        let connection_manager = self.connection_manager.clone();
        let query_timeout_secs = self.query_timeout_secs;

        let mcp = StreamableHttpService::new(
            move || {
                Ok(SteampipeService::new(
                    connection_manager.clone(),
                    query_timeout_secs,
                ))
            },
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service rejects a bare "/", so the root mount goes through
        // fallback_service instead.
        if self.endpoint == "/" {
            axum::Router::new().fallback_service(mcp)
        } else {
            axum::Router::new().nest_service(&self.endpoint, mcp)
        }
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> DbResult<()> {
        let bind_addr = self.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            DbError::connection(
                format!("could not bind {bind_addr}: {e}"),
                "Check that the port is free",
            )
        })?;
        info!(addr = %bind_addr, endpoint = %self.endpoint, "Serving MCP over HTTP");

        let server = axum::serve(listener, self.router()).with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, draining HTTP connections");
        });

        tokio::select! {
            served = server => {
                if let Err(e) = served {
                    error!(error = %e, "HTTP server failed");
                    self.connection_manager.close().await;
                    return Err(DbError::internal(format!("HTTP server failed: {e}")));
                }
                info!("HTTP server stopped");
            }
            _ = drain_deadline() => {
                warn!("Abandoning open connections");
            }
        }

        self.connection_manager.close().await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// After the first shutdown signal, resolves when the drain window elapses
/// or a second signal arrives, whichever is first.
async fn drain_deadline() {
    shutdown_signal().await;
    tokio::select! {
        _ = tokio::time::sleep(DRAIN_WINDOW) => {
            warn!(window_secs = DRAIN_WINDOW.as_secs(), "Drain window elapsed");
        }
        _ = shutdown_signal() => {
            warn!("Second signal received");
        }
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
