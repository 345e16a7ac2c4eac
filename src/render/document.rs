//! Schema-less documents used for user-data templates and overlays.
//!
//! `Document` is a recursive tagged value. It is decoupled from the YAML
//! crate so the merge algorithm can be exercised on its own, and converts
//! to and from `serde_yaml::Value` at the edges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Number, Value};
use thiserror::Error;

/// A mapping node. Keys are kept sorted so rendered output is stable.
pub type Map = BTreeMap<Key, Document>;

/// A mapping key. Keys keep their YAML scalar type: `1` and `"1"` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Key {
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    String(String),
}

/// A structured document node.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Document {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
    String(String),
    Sequence(Vec<Document>),
    Mapping(Map),
}

/// Error converting a YAML value into a [`Document`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// Mapping keys must be strings, integers or booleans.
    #[error("mapping key must be a string, integer or boolean, found {0}")]
    UnsupportedKey(&'static str),

    /// A number that fits none of `i64`, `u64` or `f64`.
    #[error("unrepresentable number {0}")]
    Number(String),
}

impl Document {
    /// Build a mapping node from key/value pairs.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, Document)>,
    {
        Document::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_mapping(&self) -> Option<&Map> {
        match self {
            Document::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a string key when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_mapping()
            .and_then(|map| map.get(&Key::String(key.to_string())))
    }

    /// Serialize to YAML bytes.
    pub fn to_yaml(&self) -> Result<Vec<u8>, serde_yaml::Error> {
        serde_yaml::to_string(self).map(String::into_bytes)
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Document::String(value.to_string())
    }
}

impl From<i64> for Document {
    fn from(value: i64) -> Self {
        Document::Integer(value)
    }
}

impl From<bool> for Document {
    fn from(value: bool) -> Self {
        Document::Bool(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Integer(value)
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => number(n)?,
            Value::String(s) => Document::String(s),
            Value::Sequence(items) => Document::Sequence(
                items
                    .into_iter()
                    .map(Document::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(Key::try_from(key)?, Document::try_from(value)?);
                }
                Document::Mapping(map)
            }
            // Tags such as `!!binary` carry no meaning for cloud-config; keep the payload.
            Value::Tagged(tagged) => Document::try_from(tagged.value)?,
        })
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        match doc {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(b),
            Document::Integer(i) => Value::Number(Number::from(i)),
            Document::Unsigned(u) => Value::Number(Number::from(u)),
            Document::Float(f) => Value::Number(Number::from(f)),
            Document::String(s) => Value::String(s),
            Document::Sequence(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            Document::Mapping(map) => {
                let mut mapping = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    mapping.insert(Value::from(key), Value::from(value));
                }
                Value::Mapping(mapping)
            }
        }
    }
}

impl TryFrom<Value> for Key {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Key::String(s)),
            Value::Bool(b) => Ok(Key::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Key::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Key::Unsigned(u))
                } else {
                    Err(DocumentError::UnsupportedKey("float"))
                }
            }
            Value::Null => Err(DocumentError::UnsupportedKey("null")),
            Value::Sequence(_) => Err(DocumentError::UnsupportedKey("sequence")),
            Value::Mapping(_) => Err(DocumentError::UnsupportedKey("mapping")),
            Value::Tagged(tagged) => Key::try_from(tagged.value),
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Bool(b) => Value::Bool(b),
            Key::Integer(i) => Value::Number(Number::from(i)),
            Key::Unsigned(u) => Value::Number(Number::from(u)),
            Key::String(s) => Value::String(s),
        }
    }
}

fn number(n: Number) -> Result<Document, DocumentError> {
    if let Some(i) = n.as_i64() {
        return Ok(Document::Integer(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Document::Unsigned(u));
    }
    n.as_f64()
        .map(Document::Float)
        .ok_or_else(|| DocumentError::Number(n.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_yaml() {
        let doc: Document = serde_yaml::from_str(
            "package_upgrade: true\nretries: 3\nruncmd:\n  - echo hi\nusers:\n  admin:\n    shell: /bin/sh\n",
        )
        .unwrap();

        assert_eq!(doc.get("package_upgrade"), Some(&Document::Bool(true)));
        assert_eq!(doc.get("retries"), Some(&Document::Integer(3)));
        assert_eq!(
            doc.get("runcmd"),
            Some(&Document::Sequence(vec!["echo hi".into()]))
        );
        assert_eq!(
            doc.get("users").and_then(|u| u.get("admin")).and_then(|a| a.get("shell")),
            Some(&Document::from("/bin/sh"))
        );
    }

    #[test]
    fn test_scalar_keys_keep_their_type() {
        let doc: Document = serde_yaml::from_str("1: one\n\"1\": quoted\ntrue: enabled\n").unwrap();
        let map = doc.as_mapping().unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Key::Integer(1)), Some(&Document::from("one")));
        assert_eq!(doc.get("1"), Some(&Document::from("quoted")));
        assert_eq!(map.get(&Key::Bool(true)), Some(&Document::from("enabled")));

        let rendered = String::from_utf8(doc.to_yaml().unwrap()).unwrap();
        let reparsed: Document = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(reparsed, doc);
        assert!(rendered.contains("\n1: one\n"), "{rendered}");
    }

    #[test]
    fn test_rejects_unsupported_keys() {
        let err = serde_yaml::from_str::<Document>("? [a, b]\n: value\n").unwrap_err();
        assert!(err.to_string().contains("mapping key must be a string, integer or boolean"));

        assert!(serde_yaml::from_str::<Document>("1.5: value\n").is_err());
        assert!(serde_yaml::from_str::<Document>("~: value\n").is_err());
    }

    #[test]
    fn test_large_unsigned_integers_survive_rendering() {
        let doc: Document = serde_yaml::from_str("big: 18446744073709551615\n").unwrap();
        assert_eq!(doc.get("big"), Some(&Document::Unsigned(u64::MAX)));

        let rendered = String::from_utf8(doc.to_yaml().unwrap()).unwrap();
        assert_eq!(rendered, "big: 18446744073709551615\n");
    }

    #[test]
    fn test_render_sorts_keys() {
        let doc = Document::mapping([("zeta", Document::from(1)), ("alpha", Document::from(2))]);
        let rendered = String::from_utf8(doc.to_yaml().unwrap()).unwrap();
        assert_eq!(rendered, "alpha: 2\nzeta: 1\n");
    }
}
