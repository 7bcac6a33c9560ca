//! Base-image tag lookup.

use crate::config::{HardenerConfig, TagRule};

/// Ordered image-name to tag table, first match wins.
///
/// Specific images are listed before the fallback, so `python:latest` gets
/// the Python tag and never the generic one.
#[derive(Debug, Clone)]
pub struct TagTable {
    rules: Vec<TagRule>,
    default_tag: String,
}

impl TagTable {
    pub fn from_config(config: &HardenerConfig) -> Self {
        Self {
            rules: config.base_image_tags.clone(),
            default_tag: config.default_tag.clone(),
        }
    }

    /// Pinned tag for an image reference (without its tag).
    pub fn lookup(&self, reference: &str) -> &str {
        let name = image_name(reference);
        self.rules
            .iter()
            .find(|rule| rule.image == name)
            .map(|rule| rule.tag.as_str())
            .unwrap_or(&self.default_tag)
    }
}

/// Last path component of an image reference, dropping registry and
/// namespace: `docker.io/library/python` -> `python`.
pub fn image_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
