//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Start background tasks (config watcher, metrics, signals)
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing is served
//! - Listener binds last (traffic only when ready)
//! - Shutdown drains in-flight requests for at most `SHUTDOWN_GRACE`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{watcher, ConfigError, ConfigStore};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::{Shutdown, SHUTDOWN_GRACE};
use crate::lifecycle::signals;
use crate::observability::metrics;

/// Process-level settings that do not live in the configuration file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub metrics_address: Option<SocketAddr>,
}

/// Errors that prevent the server from starting or running.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("watch config: {0}")]
    Watch(#[from] notify::Error),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the configuration, serve it, and return after graceful shutdown.
pub async fn run(settings: Settings) -> Result<(), StartupError> {
    let store = Arc::new(ConfigStore::open(&settings.config_path)?);
    let snapshot = store.current();
    tracing::info!(
        path = ?settings.config_path,
        rules = snapshot.rules().len(),
        listen_address = %snapshot.listen_address(),
        listen_port = snapshot.listen_port(),
        "Configuration loaded"
    );

    if let Some(addr) = settings.metrics_address {
        metrics::init_metrics(addr)?;
    }

    let _watcher = watcher::watch(store.clone())?;

    let listener = TcpListener::bind(snapshot.bind_target()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(store.clone());
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        res = signals::handle_signals(store, shutdown.clone()) => res?,
        res = &mut server_task => {
            // The server stopped without being asked to.
            return res.map_err(std::io::Error::other)?.map_err(StartupError::from);
        }
    }

    match tokio::time::timeout(SHUTDOWN_GRACE, server_task).await {
        Ok(res) => res.map_err(std::io::Error::other)??,
        Err(_) => tracing::warn!(
            grace_secs = SHUTDOWN_GRACE.as_secs(),
            "Shutdown grace period elapsed, dropping remaining connections"
        ),
    }
    Ok(())
}
