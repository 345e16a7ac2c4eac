//! Response rendering subsystem.
//!
//! # Data Flow
//! ```text
//! Snapshot build (once per configuration generation):
//!     template Document + replacements
//!     → merge.rs (recursive overlay)
//!     → YAML bytes cached on the route rule
//!
//! Per meta-data request:
//!     InstanceConfig + serial
//!     → identity.rs (one CSPRNG suffix, if enabled)
//!     → metadata.rs (instance-id / hostname / local-hostname)
//!     → YAML bytes
//! ```
//!
//! # Design Decisions
//! - User-data is merged and serialized at build time, never per request
//! - Metadata is never cached: every request gets a fresh identity

pub mod document;
pub mod identity;
pub mod merge;
pub mod metadata;

use thiserror::Error;

pub use document::{Document, Key};
pub use merge::merge;
pub use metadata::MetadataRecord;

/// Failure rendering a single response.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The secure random source could not supply bytes.
    #[error("generate suffix: read random: {0}")]
    Entropy(#[from] rand::Error),

    /// The metadata record could not be serialized.
    #[error("serialize metadata: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
