//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject empty rule sets, rules without patterns or hostnames
//! - Reject replacements that have no template to apply to
//!
//! # Design Decisions
//! - Fails fast on the first violation, naming the offending rule
//! - Checks run in a fixed order: rule count, then per rule: patterns,
//!   instance config, replacements, user-data render

use thiserror::Error;

use crate::config::schema::{ConfigFile, InstanceConfig, RouteConfig};

/// A semantic error in an otherwise well-formed configuration file.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("config has no serving configurations")]
    NoRules,

    #[error("config {rule:?} has invalid matchers: no matchers specified")]
    NoPatterns { rule: String },

    #[error("config {rule:?} has invalid matchers: compile pattern {pattern:?}: {source}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        source: regex::Error,
    },

    #[error("config {rule:?} does not have an instanceConfig set")]
    MissingInstanceConfig { rule: String },

    #[error("config {rule:?} has an invalid instance config: hostname field must be set")]
    EmptyHostname { rule: String },

    #[error("config {rule:?}: replacements can only be configured when referencing a user data template")]
    ReplacementsWithoutTemplate { rule: String },

    #[error("config {rule:?}: render user data after replacements: {source}")]
    Render {
        rule: String,
        source: serde_yaml::Error,
    },
}

impl ValidationError {
    /// Name of the rule that failed, if the error is rule-specific.
    pub fn rule(&self) -> Option<&str> {
        match self {
            ValidationError::NoRules => None,
            ValidationError::NoPatterns { rule }
            | ValidationError::InvalidPattern { rule, .. }
            | ValidationError::MissingInstanceConfig { rule }
            | ValidationError::EmptyHostname { rule }
            | ValidationError::ReplacementsWithoutTemplate { rule }
            | ValidationError::Render { rule, .. } => Some(rule),
        }
    }
}

/// At least one route rule must be declared.
pub fn validate_rule_count(file: &ConfigFile) -> Result<(), ValidationError> {
    if file.server_configs.is_empty() {
        return Err(ValidationError::NoRules);
    }
    Ok(())
}

/// The instance config must be present with a non-empty hostname.
pub fn validate_instance_config(rule: &RouteConfig) -> Result<&InstanceConfig, ValidationError> {
    let instance = rule
        .instance_config
        .as_ref()
        .ok_or_else(|| ValidationError::MissingInstanceConfig {
            rule: rule.name.clone(),
        })?;
    if instance.hostname.is_empty() {
        return Err(ValidationError::EmptyHostname {
            rule: rule.name.clone(),
        });
    }
    Ok(instance)
}

/// Replacements are only meaningful on top of a template.
pub fn validate_replacements(rule: &RouteConfig) -> Result<(), ValidationError> {
    if rule.template_ref().is_none() && rule.has_replacements() {
        return Err(ValidationError::ReplacementsWithoutTemplate {
            rule: rule.name.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::document::{Document, Key, Map};

    fn rule(hostname: Option<&str>) -> RouteConfig {
        RouteConfig {
            name: "r1".into(),
            match_patterns: vec!["dev".into()],
            instance_config: hostname.map(|h| InstanceConfig {
                hostname: h.into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_rules() {
        let err = validate_rule_count(&ConfigFile::default()).unwrap_err();
        assert!(matches!(err, ValidationError::NoRules));
        assert_eq!(err.rule(), None);
    }

    #[test]
    fn test_missing_instance_config() {
        let err = validate_instance_config(&rule(None)).unwrap_err();
        assert!(matches!(err, ValidationError::MissingInstanceConfig { .. }));
        assert_eq!(err.rule(), Some("r1"));
    }

    #[test]
    fn test_empty_hostname() {
        let err = validate_instance_config(&rule(Some(""))).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyHostname { .. }));
        assert!(err.to_string().contains("hostname field must be set"));
    }

    #[test]
    fn test_valid_instance_config() {
        let r = rule(Some("host"));
        assert_eq!(validate_instance_config(&r).unwrap().hostname, "host");
    }

    #[test]
    fn test_replacements_require_template() {
        let mut r = rule(Some("host"));
        r.replacements = Some(Map::from([(Key::from("a"), Document::from(1))]));
        let err = validate_replacements(&r).unwrap_err();
        assert!(matches!(err, ValidationError::ReplacementsWithoutTemplate { .. }));

        r.user_data_template = Some("basic".into());
        assert!(validate_replacements(&r).is_ok());
    }

    #[test]
    fn test_empty_replacements_without_template_allowed() {
        let mut r = rule(Some("host"));
        r.replacements = Some(Map::new());
        assert!(validate_replacements(&r).is_ok());
    }
}
