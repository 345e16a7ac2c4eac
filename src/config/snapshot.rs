//! Immutable configuration generations.

use std::collections::BTreeMap;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::{ConfigFile, DEFAULT_LISTEN_ADDRESS, DEFAULT_LISTEN_PORT};
use crate::config::validation::validate_rule_count;
use crate::render::document::Map;
use crate::routing::router::match_path;
use crate::routing::rule::RouteRule;

/// One fully validated configuration generation.
///
/// Everything a request needs is precomputed here; a snapshot is never
/// modified after construction, only replaced.
#[derive(Debug)]
pub struct Snapshot {
    listen_address: String,
    listen_port: u16,
    user_data_templates: BTreeMap<String, Map>,
    rules: Vec<RouteRule>,
}

impl Snapshot {
    /// Parse, validate and compile configuration text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Self::from_config(parse_config(text)?)
    }

    /// Validate and compile an already parsed configuration.
    pub fn from_config(file: ConfigFile) -> Result<Self, ConfigError> {
        validate_rule_count(&file)?;

        let ConfigFile {
            listen_address,
            listen_port,
            user_data_templates,
            server_configs,
        } = file;

        let rules = server_configs
            .into_iter()
            .map(|rule| RouteRule::build(rule, &user_data_templates))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            listen_address: if listen_address.is_empty() {
                DEFAULT_LISTEN_ADDRESS.to_string()
            } else {
                listen_address
            },
            listen_port: if listen_port == 0 {
                DEFAULT_LISTEN_PORT
            } else {
                listen_port
            },
            user_data_templates,
            rules,
        })
    }

    pub fn listen_address(&self) -> &str {
        &self.listen_address
    }

    pub fn listen_port(&self) -> u16 {
        self.listen_port
    }

    /// `(address, port)` suitable for `TcpListener::bind`.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.listen_address.as_str(), self.listen_port)
    }

    pub fn user_data_templates(&self) -> &BTreeMap<String, Map> {
        &self.user_data_templates
    }

    /// Route rules in match order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// First rule whose patterns match `path`.
    pub fn match_path(&self, path: &str) -> Option<&RouteRule> {
        match_path(&self.rules, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::ValidationError;

    const MINIMAL: &str =
        "serverConfigs:\n  - name: dev\n    matchPatterns: [dev]\n    instanceConfig: {hostname: h}\n";

    #[test]
    fn test_defaults_applied() {
        let snapshot = Snapshot::from_yaml(MINIMAL).unwrap();
        assert_eq!(snapshot.listen_address(), "0.0.0.0");
        assert_eq!(snapshot.listen_port(), 8000);
        assert_eq!(snapshot.bind_target(), ("0.0.0.0", 8000));
    }

    #[test]
    fn test_explicit_listen_settings() {
        let snapshot =
            Snapshot::from_yaml(&format!("listenAddress: 127.0.0.1\nlistenPort: 9100\n{MINIMAL}"))
                .unwrap();
        assert_eq!(snapshot.bind_target(), ("127.0.0.1", 9100));
    }

    #[test]
    fn test_zero_rules_rejected() {
        let err = Snapshot::from_yaml("userDataTemplates: {basic: {a: 1}}\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ValidationError::NoRules)));
    }

    #[test]
    fn test_first_invalid_rule_reported() {
        let err = Snapshot::from_yaml(
            r#"
serverConfigs:
  - name: good
    matchPatterns: [a]
    instanceConfig: {hostname: h}
  - name: no-host
    matchPatterns: [b]
    instanceConfig: {hostname: ""}
  - name: no-patterns
    instanceConfig: {hostname: h}
"#,
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(e) => assert_eq!(e.rule(), Some("no-host")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rule_order_preserved() {
        let snapshot = Snapshot::from_yaml(
            r#"
serverConfigs:
  - {name: z, matchPatterns: [a], instanceConfig: {hostname: h}}
  - {name: a, matchPatterns: [b], instanceConfig: {hostname: h}}
  - {name: m, matchPatterns: [c], instanceConfig: {hostname: h}}
"#,
        )
        .unwrap();
        let names: Vec<_> = snapshot.rules().iter().map(RouteRule::name).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }
}
