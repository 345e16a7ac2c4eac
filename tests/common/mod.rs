//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use nocloud_server::{ConfigStore, HttpServer, Shutdown, Snapshot};
use tokio::net::TcpListener;

/// Configuration used by most tests: one rule matching `dev`.
pub const BASIC_CONFIG: &str = r#"
userDataTemplates:
  basic:
    package_upgrade: true
serverConfigs:
  - name: basic-dev
    matchPatterns: ["dev"]
    instanceConfig:
      hostname: basic-dev
      enableInstanceIDSuffix: true
      enableHostnameSuffix: true
      hostnameSuffixSize: 4
    userDataTemplate: basic
    replacements:
      ssh_authorized_keys: ["k1"]
"#;

/// A running server bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<ConfigStore>,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server on 127.0.0.1 serving `store`.
pub async fn start_server(store: Arc<ConfigStore>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(store.clone());
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestServer {
        addr,
        store,
        shutdown,
    }
}

/// Start a server from in-memory configuration text.
#[allow(dead_code)]
pub async fn start_from_str(config: &str) -> TestServer {
    let snapshot = Snapshot::from_yaml(config).unwrap();
    start_server(Arc::new(ConfigStore::new("unused.yaml", snapshot))).await
}

/// Start a server from a configuration file on disk.
#[allow(dead_code)]
pub async fn start_from_file(path: &Path) -> TestServer {
    start_server(Arc::new(ConfigStore::open(path).unwrap())).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
