//! Cloud-Init NoCloud metadata server library.
//!
//! Answers `meta-data`, `user-data` and `vendor-data` requests by matching
//! the request path against an ordered list of route rules from a YAML
//! configuration file that is hot-reloaded on change.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;

pub use config::{ConfigStore, Snapshot};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
