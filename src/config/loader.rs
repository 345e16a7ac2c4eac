//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ConfigFile;
use crate::config::snapshot::Snapshot;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("read config {path:?}: {source}")]
    Source {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a well-formed configuration document.
    #[error("parse config: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// The document is well-formed but semantically invalid.
    #[error("validate config: {0}")]
    Validation(#[from] ValidationError),
}

/// Parse configuration text without validating it.
pub fn parse_config(text: &str) -> Result<ConfigFile, ConfigError> {
    Ok(serde_yaml::from_str(text)?)
}

/// Load, validate and compile the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<Snapshot, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Source {
        path: path.to_path_buf(),
        source,
    })?;
    Snapshot::from_yaml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/nocloud/config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Source { .. }));
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = parse_config("serverConfigs: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }

    #[test]
    fn test_wrong_shape_is_syntax_error() {
        let err = parse_config("serverConfigs: {name: not-a-list}").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "serverConfigs:\n  - name: dev\n    matchPatterns: [dev]\n    instanceConfig: {{hostname: h}}"
        )
        .unwrap();

        let snapshot = load_config(file.path()).unwrap();
        assert_eq!(snapshot.rules().len(), 1);
    }

    #[test]
    fn test_invalid_file_is_validation_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listenPort: 8000").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ValidationError::NoRules)));
    }
}
