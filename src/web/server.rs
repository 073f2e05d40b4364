//! Web server implementation
//!
//! Provides the main server struct and configuration.

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::routes::{api_routes, AppState};
use super::{DEFAULT_BIND, DEFAULT_PORT, DEFAULT_UPLOAD_LIMIT};
use crate::convert::{DEFAULT_TIMEOUT_SECS, DEFAULT_TOOL};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum upload size in bytes
    pub upload_limit: usize,
    /// Path to the conversion tool
    pub tool: PathBuf,
    /// Per-conversion timeout
    pub convert_timeout: Duration,
    /// Scratch directory; a process-owned temp dir when unset
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            upload_limit: DEFAULT_UPLOAD_LIMIT,
            tool: PathBuf::from(DEFAULT_TOOL),
            convert_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            scratch_dir: None,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with the given port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Create a new server config with the given bind address
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Create a new server config with the given upload limit
    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.upload_limit = limit;
        self
    }

    /// Create a new server config with the given conversion tool
    pub fn with_tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.tool = tool.into();
        self
    }

    /// Create a new server config with the given conversion timeout
    pub fn with_convert_timeout(mut self, timeout: Duration) -> Self {
        self.convert_timeout = timeout;
        self
    }

    /// Create a new server config with the given scratch directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind, self.port).parse()
    }
}

/// Web server instance
pub struct WebServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server with default configuration
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(ServerConfig::default())
    }

    /// Create a new web server with the given configuration
    pub fn with_config(config: ServerConfig) -> anyhow::Result<Self> {
        let state = AppState::new(&config).context("failed to set up scratch directory")?;
        Ok(Self {
            config,
            state: Arc::new(state),
        })
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router
    pub fn router(&self) -> Router {
        Router::new()
            .merge(api_routes())
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(self.config.upload_limit))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until shutdown.
    ///
    /// A bind failure is fatal; per-request failures are not.
    pub async fn run(&self) -> anyhow::Result<()> {
        let addr = self.config.socket_addr()?;
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let addr = listener.local_addr()?;
        tracing::info!("listening on http://{addr}");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.upload_limit, 512 * 1024 * 1024);
        assert_eq!(config.tool, PathBuf::from("ffmpeg"));
        assert_eq!(config.convert_timeout, Duration::from_secs(300));
        assert!(config.scratch_dir.is_none());
    }

    #[test]
    fn test_server_config_builder() {
        let config = ServerConfig::default()
            .with_port(3000)
            .with_bind("127.0.0.1")
            .with_upload_limit(100 * 1024 * 1024)
            .with_tool("/usr/local/bin/ffmpeg")
            .with_convert_timeout(Duration::from_secs(30))
            .with_scratch_dir("/var/tmp/vid2gif");

        assert_eq!(config.port, 3000);
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.upload_limit, 100 * 1024 * 1024);
        assert_eq!(config.tool, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.convert_timeout, Duration::from_secs(30));
        assert_eq!(config.scratch_dir, Some(PathBuf::from("/var/tmp/vid2gif")));
    }

    #[test]
    fn test_server_config_socket_addr() {
        let config = ServerConfig::default();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
    }

    #[test]
    fn test_server_config_bad_bind() {
        let config = ServerConfig::default().with_bind("not an address");
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_web_server_with_config() {
        let config = ServerConfig::default().with_port(9000);
        let server = WebServer::with_config(config).unwrap();
        assert_eq!(server.config().port, 9000);
        // Router builds without panicking.
        let _ = server.router();
    }
}
