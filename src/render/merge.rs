//! Template merge engine.
//!
//! Overlay keys win. Two mappings under the same key are merged
//! recursively; every other combination replaces the base value outright,
//! so sequences are never merged element-wise.

use crate::render::document::{Document, Map};

/// Merge `overlay` onto a copy of `base`.
pub fn merge(base: &Document, overlay: &Document) -> Document {
    match (base, overlay) {
        (Document::Mapping(base), Document::Mapping(overlay)) => {
            Document::Mapping(merge_mappings(base, overlay))
        }
        _ => overlay.clone(),
    }
}

/// Mapping-level merge used for templates and replacements.
pub fn merge_mappings(base: &Map, overlay: &Map) -> Map {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let next = match merged.get(key) {
            Some(existing) => merge(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}
