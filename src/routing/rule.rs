//! Compiled route rules.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::config::schema::{InstanceConfig, RouteConfig};
use crate::config::validation::{
    validate_instance_config, validate_replacements, ValidationError,
};
use crate::render::document::{Document, Map};
use crate::render::merge::merge_mappings;
use crate::routing::matcher::{AnyMatcher, Matcher};

/// A validated route rule with its derived state.
///
/// Built once per snapshot and never mutated afterwards.
#[derive(Debug)]
pub struct RouteRule {
    name: String,
    matcher: AnyMatcher,
    instance_config: InstanceConfig,
    template: Option<String>,
    rendered_user_data: Option<Bytes>,
}

impl RouteRule {
    /// Validate `config` and precompute its matchers and user-data.
    pub fn build(
        config: RouteConfig,
        templates: &BTreeMap<String, Map>,
    ) -> Result<Self, ValidationError> {
        let matcher = AnyMatcher::compile(&config.name, &config.match_patterns)?;
        let instance_config = validate_instance_config(&config)?.clone();
        validate_replacements(&config)?;

        let template = config.template_ref().map(str::to_string);
        let rendered_user_data = match template.as_deref() {
            Some(name) => match templates.get(name) {
                Some(base) => Some(render_user_data(&config, base)?),
                None => {
                    tracing::warn!(
                        rule = %config.name,
                        template = %name,
                        "User data template not found, serving empty user-data"
                    );
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            name: config.name,
            matcher,
            instance_config,
            template,
            rendered_user_data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.matcher.patterns()
    }

    pub fn instance_config(&self) -> &InstanceConfig {
        &self.instance_config
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Cached user-data; `None` when no template was resolved.
    pub fn rendered_user_data(&self) -> Option<&Bytes> {
        self.rendered_user_data.as_ref()
    }

    /// Referenced template that was not defined in the file.
    pub fn missing_template(&self) -> Option<&str> {
        match self.rendered_user_data {
            Some(_) => None,
            None => self.template(),
        }
    }
}

fn render_user_data(config: &RouteConfig, base: &Map) -> Result<Bytes, ValidationError> {
    let merged = match &config.replacements {
        Some(overlay) if !overlay.is_empty() => merge_mappings(base, overlay),
        _ => base.clone(),
    };
    Document::Mapping(merged)
        .to_yaml()
        .map(Bytes::from)
        .map_err(|source| ValidationError::Render {
            rule: config.name.clone(),
            source,
        })
}
