//! Configuration file watcher for hot reload.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::store::ConfigStore;

/// Reloads a [`ConfigStore`] whenever its file changes on disk.
///
/// The parent directory is watched rather than the file itself so that
/// editors which save by renaming a temporary file are still observed.
pub struct ConfigWatcher {
    store: Arc<ConfigStore>,
    dir: PathBuf,
    file_name: OsString,
}

impl ConfigWatcher {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        let path = store.path();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(OsString::from).unwrap_or_default();
        Self {
            store,
            dir,
            file_name,
        }
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let store = self.store.clone();
        let file_name = self.file_name.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if (event.kind.is_modify() || event.kind.is_create())
                        && touches(&event, &file_name)
                    {
                        tracing::info!(kind = ?event.kind, "Config file change detected, reloading");
                        // Errors are logged by the store; the previous snapshot stays live.
                        let _ = store.reload();
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Config watcher encountered an error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.store.path(), "Config watcher started");
        Ok(watcher)
    }
}

fn touches(event: &Event, file_name: &OsStr) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name().is_some_and(|name| name == file_name))
}

/// Convenience wrapper: watch `store`'s file until the watcher is dropped.
pub fn watch(store: Arc<ConfigStore>) -> Result<RecommendedWatcher, notify::Error> {
    ConfigWatcher::new(store).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind};

    #[test]
    fn test_event_filter_matches_file_name() {
        let file_name = OsString::from("config.yaml");
        let hit = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/etc/nocloud/config.yaml"));
        let miss = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/etc/nocloud/.config.yaml.swp"));

        assert!(touches(&hit, &file_name));
        assert!(!touches(&miss, &file_name));
    }

    #[test]
    fn test_relative_path_watches_cwd() {
        let snapshot = crate::config::Snapshot::from_yaml(
            "serverConfigs:\n  - name: dev\n    matchPatterns: [dev]\n    instanceConfig: {hostname: h}\n",
        )
        .unwrap();
        let store = Arc::new(ConfigStore::new("config.yaml", snapshot));
        let watcher = ConfigWatcher::new(store);
        assert_eq!(watcher.dir, PathBuf::from("."));
        assert_eq!(watcher.file_name, OsString::from("config.yaml"));
    }
}
