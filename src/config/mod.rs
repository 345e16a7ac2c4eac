//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML)
//!     → loader.rs (read & deserialize into schema.rs types)
//!     → validation.rs (semantic checks)
//!     → snapshot.rs (compile patterns, render user-data)
//!     → store.rs (Arc<Snapshot> behind ArcSwap)
//!
//! On reload signal (file change or SIGHUP):
//!     watcher.rs / lifecycle::signals
//!     → store.rs reload: build a full snapshot off to the side
//!     → atomic swap only if it validated
//!     → in-flight requests finish on the snapshot they hold
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; changes require a full rebuild
//! - A failed reload never disturbs the snapshot being served
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{ConfigFile, InstanceConfig, RouteConfig};
pub use snapshot::Snapshot;
pub use store::{ConfigStore, Reloaded};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
