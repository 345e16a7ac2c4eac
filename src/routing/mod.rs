//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (scan rules in declaration order)
//!     → matcher.rs (evaluate a rule's regex patterns)
//!     → trailing segment selects meta-data / user-data / vendor-data
//!     → Return: rendered body or DispatchError
//!
//! Rule Compilation (at snapshot build):
//!     RouteConfig[]
//!     → rule.rs (compile patterns, validate, render user-data)
//!     → Freeze inside an immutable Snapshot
//! ```
//!
//! # Design Decisions
//! - Rules compiled once per configuration generation, immutable at runtime
//! - Deterministic: same path and snapshot always select the same rule
//! - First match wins (declaration order, no specificity ranking)

pub mod matcher;
pub mod router;
pub mod rule;

pub use router::{decode_path, dispatch, DispatchError, Dispatched, Endpoint};
pub use rule::RouteRule;
