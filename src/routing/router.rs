//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Find the first rule whose patterns match the request path
//! - Dispatch on the trailing path segment (`meta-data`, `user-data`, `vendor-data`)
//! - Return a rendered body or an explicit error
//!
//! # Design Decisions
//! - Declaration order is the only priority: an earlier broad rule always
//!   shadows a later specific one
//! - Operates on a borrowed snapshot, so a request never sees two generations

use std::borrow::Cow;

use bytes::Bytes;
use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::config::Snapshot;
use crate::render::{metadata, RenderError};
use crate::routing::rule::RouteRule;

/// The NoCloud documents served under a matched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    MetaData,
    UserData,
    VendorData,
}

impl Endpoint {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "meta-data" => Some(Endpoint::MetaData),
            "user-data" => Some(Endpoint::UserData),
            "vendor-data" => Some(Endpoint::VendorData),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::MetaData => "meta-data",
            Endpoint::UserData => "user-data",
            Endpoint::VendorData => "vendor-data",
        }
    }
}

/// A successfully rendered response.
#[derive(Debug)]
pub struct Dispatched<'a> {
    pub rule: &'a RouteRule,
    pub endpoint: Endpoint,
    pub body: Bytes,
}

/// Why a request could not be served.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The percent-decoded path is not valid UTF-8.
    #[error("malformed request path {path:?}")]
    MalformedPath { path: String },

    /// No rule matched the path.
    #[error("no route matches {path:?}")]
    NoRoute { path: String },

    /// A rule matched but the trailing segment is not a NoCloud document.
    #[error("config {rule:?} has no endpoint {segment:?}")]
    UnknownEndpoint { rule: String, segment: String },

    /// Rendering `meta-data` failed.
    #[error("{source}")]
    Render {
        rule: String,
        #[source]
        source: RenderError,
    },
}

impl DispatchError {
    /// Rule that matched before the failure, if any.
    pub fn rule(&self) -> Option<&str> {
        match self {
            DispatchError::MalformedPath { .. } | DispatchError::NoRoute { .. } => None,
            DispatchError::UnknownEndpoint { rule, .. } | DispatchError::Render { rule, .. } => {
                Some(rule)
            }
        }
    }
}

/// Percent-decode a raw request path. Patterns and serials see the decoded form.
pub fn decode_path(raw: &str) -> Result<Cow<'_, str>, DispatchError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| DispatchError::MalformedPath {
            path: raw.to_string(),
        })
}

/// First rule, in declaration order, with a pattern matching `path`.
pub fn match_path<'a>(rules: &'a [RouteRule], path: &str) -> Option<&'a RouteRule> {
    rules.iter().find(|rule| rule.matches(path))
}

/// Resolve `path` against `snapshot` and render the response body.
pub fn dispatch<'a>(snapshot: &'a Snapshot, path: &str) -> Result<Dispatched<'a>, DispatchError> {
    let rule = snapshot
        .match_path(path)
        .ok_or_else(|| DispatchError::NoRoute {
            path: path.to_string(),
        })?;

    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or_default();
    let endpoint = Endpoint::from_segment(last).ok_or_else(|| DispatchError::UnknownEndpoint {
        rule: rule.name().to_string(),
        segment: last.to_string(),
    })?;

    let body = match endpoint {
        Endpoint::MetaData => {
            let serial = segments.next().unwrap_or_default();
            metadata::render(rule.instance_config(), serial)
                .and_then(|record| record.to_yaml())
                .map(Bytes::from)
                .map_err(|source| DispatchError::Render {
                    rule: rule.name().to_string(),
                    source,
                })?
        }
        Endpoint::UserData => rule.rendered_user_data().cloned().unwrap_or_default(),
        Endpoint::VendorData => Bytes::new(),
    };

    Ok(Dispatched {
        rule,
        endpoint,
        body,
    })
}
