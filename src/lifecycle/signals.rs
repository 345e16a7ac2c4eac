//! OS signal handling.
//!
//! # Responsibilities
//! - SIGTERM/SIGINT → trigger graceful shutdown
//! - SIGHUP → reload the configuration (Unix only)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Reloads run on the blocking pool; the store serializes them

use std::sync::Arc;

use crate::config::ConfigStore;
use crate::lifecycle::shutdown::Shutdown;

/// Reload `store` off the async workers. Failures are logged by the store.
pub async fn reload(store: Arc<ConfigStore>) {
    if let Err(e) = tokio::task::spawn_blocking(move || store.reload()).await {
        tracing::error!(error = %e, "Config reload task failed");
    }
}

/// Handle process signals until a termination signal arrives.
#[cfg(unix)]
pub async fn handle_signals(store: Arc<ConfigStore>, shutdown: Shutdown) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                tracing::info!("SIGHUP received, reloading configuration");
                reload(store.clone()).await;
            }
            _ = terminate.recv() => {
                tracing::info!("SIGTERM received, shutting down");
                break;
            }
            _ = interrupt.recv() => {
                tracing::info!("SIGINT received, shutting down");
                break;
            }
        }
    }

    shutdown.trigger();
    Ok(())
}

/// Handle process signals until a termination signal arrives.
#[cfg(not(unix))]
pub async fn handle_signals(_store: Arc<ConfigStore>, shutdown: Shutdown) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl+C received, shutting down");
    shutdown.trigger();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Snapshot;

    #[tokio::test]
    async fn test_reload_task_keeps_snapshot_on_error() {
        let snapshot = Snapshot::from_yaml(
            "serverConfigs:\n  - name: dev\n    matchPatterns: [dev]\n    instanceConfig: {hostname: h}\n",
        )
        .unwrap();
        let store = Arc::new(ConfigStore::new("/nonexistent/nocloud.yaml", snapshot));

        reload(store.clone()).await;

        assert_eq!(store.current().rules()[0].name(), "dev");
    }
}
