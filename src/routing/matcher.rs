//! Route matching logic.
//!
//! # Responsibilities
//! - Compile a rule's match patterns once, at snapshot build time
//! - Test a request path against them with OR semantics
//!
//! # Design Decisions
//! - Patterns are regular expressions, unanchored: `dev` matches `/dev/x/meta-data`
//! - Matching is on the request path only, never on headers or query

use regex::Regex;

use crate::config::validation::ValidationError;

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches a single compiled regular expression.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Matcher for RegexMatcher {
    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug, Clone)]
pub struct AnyMatcher {
    matchers: Vec<RegexMatcher>,
}

impl AnyMatcher {
    /// Compile every pattern of rule `rule`; at least one is required.
    pub fn compile(rule: &str, patterns: &[String]) -> Result<Self, ValidationError> {
        if patterns.is_empty() {
            return Err(ValidationError::NoPatterns {
                rule: rule.to_string(),
            });
        }
        let matchers = patterns
            .iter()
            .map(|pattern| {
                RegexMatcher::new(pattern).map_err(|source| ValidationError::InvalidPattern {
                    rule: rule.to_string(),
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.matchers.iter().map(RegexMatcher::as_str)
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_regex_matcher_unanchored() {
        let matcher = RegexMatcher::new("dev").unwrap();
        assert!(matcher.matches("/dev/abcd/meta-data"));
        assert!(matcher.matches("/x/devbox/user-data"));
        assert!(!matcher.matches("/prod/abcd/meta-data"));
    }

    #[test]
    fn test_regex_matcher_anchored() {
        let matcher = RegexMatcher::new("^/prod/").unwrap();
        assert!(matcher.matches("/prod/1/meta-data"));
        assert!(!matcher.matches("/x/prod/1/meta-data"));
    }

    #[test]
    fn test_any_matcher() {
        let matcher = AnyMatcher::compile("r", &patterns(&["^/a/", "^/b/"])).unwrap();
        assert!(matcher.matches("/a/1/meta-data"));
        assert!(matcher.matches("/b/1/meta-data"));
        assert!(!matcher.matches("/c/1/meta-data"));
        assert_eq!(matcher.patterns().collect::<Vec<_>>(), vec!["^/a/", "^/b/"]);
    }

    #[test]
    fn test_no_patterns_rejected() {
        let err = AnyMatcher::compile("empty", &[]).unwrap_err();
        assert!(matches!(err, ValidationError::NoPatterns { ref rule } if rule == "empty"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = AnyMatcher::compile("broken", &patterns(&["ok", "(unclosed"])).unwrap_err();
        match err {
            ValidationError::InvalidPattern { rule, pattern, .. } => {
                assert_eq!(rule, "broken");
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
