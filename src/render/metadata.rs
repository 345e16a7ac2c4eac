//! Per-request `meta-data` rendering.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::schema::InstanceConfig;
use crate::render::identity::{generate_suffix_with, suffix_len};
use crate::render::RenderError;

/// The NoCloud `meta-data` document for one request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetadataRecord {
    #[serde(rename = "instance-id")]
    pub instance_id: String,

    #[serde(rename = "local-hostname")]
    pub local_hostname: String,

    pub hostname: String,
}

impl MetadataRecord {
    pub fn to_yaml(&self) -> Result<Vec<u8>, RenderError> {
        Ok(serde_yaml::to_string(self)?.into_bytes())
    }
}

/// Render the record for `serial`, drawing any suffix from the OS.
pub fn render(config: &InstanceConfig, serial: &str) -> Result<MetadataRecord, RenderError> {
    render_with(&mut OsRng, config, serial)
}

/// Render the record for `serial` with an explicit random source.
///
/// At most one suffix is generated per call; when both suffix flags are
/// set the hostname fields and the instance ID share it.
pub fn render_with<R: RngCore + ?Sized>(
    rng: &mut R,
    config: &InstanceConfig,
    serial: &str,
) -> Result<MetadataRecord, RenderError> {
    let mut record = MetadataRecord {
        instance_id: format!("i-{serial}"),
        local_hostname: config.hostname.clone(),
        hostname: config.hostname.clone(),
    };

    if !(config.enable_hostname_suffix || config.enable_instance_id_suffix) {
        return Ok(record);
    }

    let suffix = generate_suffix_with(rng, suffix_len(config.suffix_byte_length))?;
    if config.enable_hostname_suffix {
        record.hostname.push_str(&suffix);
        record.local_hostname.push_str(&suffix);
    }
    if config.enable_instance_id_suffix {
        record.instance_id.push_str(&suffix);
    }
    Ok(record)
}
