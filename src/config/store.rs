//! The live configuration shared by every request.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use crate::config::loader::{load_config, ConfigError};
use crate::config::snapshot::Snapshot;
use crate::observability::metrics;

/// Result of a successful reload.
#[derive(Debug, Clone)]
pub struct Reloaded {
    /// The snapshot now being served.
    pub snapshot: Arc<Snapshot>,

    /// Listen address or port differ from the previous snapshot.
    /// The running listener is not rebound.
    pub listen_changed: bool,
}

/// Holds the current [`Snapshot`] and swaps it atomically on reload.
///
/// Readers call [`current`](Self::current) once per request and keep the
/// returned `Arc` for the rest of it; an install never waits for them.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    current: ArcSwap<Snapshot>,
    /// Serializes writers so two reload triggers never interleave.
    reload_lock: Mutex<()>,
}

impl ConfigStore {
    /// Create a store serving `snapshot`, reloading from `path`.
    pub fn new(path: impl Into<PathBuf>, snapshot: Snapshot) -> Self {
        metrics::record_rule_count(snapshot.rules().len());
        Self {
            path: path.into(),
            current: ArcSwap::from_pointee(snapshot),
            reload_lock: Mutex::new(()),
        }
    }

    /// Load `path` and create a store serving it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let snapshot = load_config(&path)?;
        Ok(Self::new(path, snapshot))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The snapshot installed right now.
    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Atomically replace the current snapshot, returning the previous one.
    pub fn install(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        self.install_arc(Arc::new(snapshot))
    }

    fn install_arc(&self, snapshot: Arc<Snapshot>) -> Arc<Snapshot> {
        let rules = snapshot.rules().len();
        let previous = self.current.swap(snapshot);
        metrics::record_rule_count(rules);
        previous
    }

    /// Re-read the configuration file and install it.
    ///
    /// On failure the current snapshot keeps serving.
    pub fn reload(&self) -> Result<Reloaded, ConfigError> {
        self.reload_with(|| load_config(&self.path))
    }

    /// Build a snapshot from `text` and install it.
    ///
    /// On failure the current snapshot keeps serving.
    pub fn reload_from_str(&self, text: &str) -> Result<Reloaded, ConfigError> {
        self.reload_with(|| Snapshot::from_yaml(text))
    }

    fn reload_with<F>(&self, build: F) -> Result<Reloaded, ConfigError>
    where
        F: FnOnce() -> Result<Snapshot, ConfigError>,
    {
        let _writer = self
            .reload_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let snapshot = match build() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                metrics::record_reload(false);
                tracing::error!(
                    path = ?self.path,
                    error = %e,
                    "Failed to reload config. Keeping current configuration."
                );
                return Err(e);
            }
        };

        let snapshot = Arc::new(snapshot);
        let previous = self.install_arc(snapshot.clone());
        let listen_changed = previous.bind_target() != snapshot.bind_target();

        metrics::record_reload(true);
        tracing::info!(
            path = ?self.path,
            rules = snapshot.rules().len(),
            "Configuration reloaded"
        );
        if listen_changed {
            tracing::warn!(
                listen_address = %snapshot.listen_address(),
                listen_port = snapshot.listen_port(),
                "Listen settings changed; restart to rebind"
            );
        }

        Ok(Reloaded {
            snapshot,
            listen_changed,
        })
    }
}
