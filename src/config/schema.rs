//! Configuration schema definitions.
//!
//! These types mirror the YAML file one-to-one. They carry no derived
//! state; [`Snapshot`](crate::config::Snapshot) builds the compiled form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::render::document::Map;

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 8000;

/// Root of the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    /// Bind address. Empty means [`DEFAULT_LISTEN_ADDRESS`].
    pub listen_address: String,

    /// Bind port. Zero means [`DEFAULT_LISTEN_PORT`].
    pub listen_port: u16,

    /// Shared user-data documents, referenced by name from route rules.
    pub user_data_templates: BTreeMap<String, Map>,

    /// Route rules, in match order.
    pub server_configs: Vec<RouteConfig>,
}

/// One route rule as written in the file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// Rule identifier for logging/metrics.
    #[serde(default)]
    pub name: String,

    /// Regular expressions tested against the request path.
    #[serde(default)]
    pub match_patterns: Vec<String>,

    /// Identity settings; required.
    #[serde(default)]
    pub instance_config: Option<InstanceConfig>,

    /// Name of an entry in `userDataTemplates`.
    #[serde(default)]
    pub user_data_template: Option<String>,

    /// Overlay merged onto the referenced template.
    #[serde(default)]
    pub replacements: Option<Map>,
}

impl RouteConfig {
    /// Template reference, with an empty string treated as unset.
    pub fn template_ref(&self) -> Option<&str> {
        self.user_data_template.as_deref().filter(|name| !name.is_empty())
    }

    pub fn has_replacements(&self) -> bool {
        self.replacements.as_ref().is_some_and(|r| !r.is_empty())
    }
}

/// Identity settings for `meta-data` responses.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceConfig {
    #[serde(default)]
    pub hostname: String,

    #[serde(default, rename = "enableInstanceIDSuffix")]
    pub enable_instance_id_suffix: bool,

    #[serde(default)]
    pub enable_hostname_suffix: bool,

    /// Random bytes in the suffix; zero or negative means 4.
    #[serde(default, rename = "hostnameSuffixSize", alias = "suffixByteLength")]
    pub suffix_byte_length: i64,
}
