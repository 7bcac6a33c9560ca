//! Hardener configuration.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields the stock rule set.

use dockharden_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Base-image tag replacement for one image name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    /// Image name, compared against the last path component of the reference.
    pub image: String,
    /// Tag substituted for `latest`.
    pub tag: String,
}

impl TagRule {
    pub fn new(image: &str, tag: &str) -> Self {
        Self {
            image: image.to_string(),
            tag: tag.to_string(),
        }
    }
}

/// Configuration for the hardener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardenerConfig {
    /// Account created by the inserted user block.
    pub user: String,
    /// Group created by the inserted user block.
    pub group: String,
    /// Ordered tag table, first match wins.
    pub base_image_tags: Vec<TagRule>,
    /// Tag used when no entry in `base_image_tags` matches.
    pub default_tag: String,
    /// Commands chained after a package install that follows an index refresh.
    pub package_cleanup: Vec<String>,
}

impl Default for HardenerConfig {
    fn default() -> Self {
        Self {
            user: "appuser".to_string(),
            group: "appuser".to_string(),
            base_image_tags: vec![
                TagRule::new("python", "3.9-slim"),
                TagRule::new("ubuntu", "20.04"),
            ],
            default_tag: "18-slim".to_string(),
            package_cleanup: vec![
                "apt-get clean".to_string(),
                "rm -rf /var/lib/apt/lists/*".to_string(),
            ],
        }
    }
}

impl HardenerConfig {
    /// Parse a configuration from YAML and validate it.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: HardenerConfig = if content.trim().is_empty() {
            HardenerConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading hardener config from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Reject values that would produce a broken Dockerfile.
    pub fn validate(&self) -> Result<()> {
        check_word("user", &self.user)?;
        check_word("group", &self.group)?;
        check_tag(&self.default_tag)?;

        for rule in &self.base_image_tags {
            check_word("base_image_tags.image", &rule.image)?;
            if rule.image.contains('/') || rule.image.contains(':') {
                return Err(Error::Config(format!(
                    "base_image_tags.image must be a bare image name, got '{}'",
                    rule.image
                )));
            }
            check_tag(&rule.tag)?;
        }

        if self.package_cleanup.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::Config(
                "package_cleanup entries must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Text appended to a package install line: one continuation per cleanup
    /// command.
    pub fn cleanup_suffix(&self) -> String {
        self.package_cleanup
            .iter()
            .map(|command| format!("{}{}", crate::patterns::CONTINUATION, command))
            .collect()
    }
}

fn check_word(field: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(Error::Config(format!(
            "{} must be a single non-empty word, got '{}'",
            field, value
        )));
    }
    Ok(())
}

fn check_tag(tag: &str) -> Result<()> {
    check_word("tag", tag)?;
    if tag.contains(':') || tag == "latest" {
        return Err(Error::Config(format!("'{}' is not a pinned tag", tag)));
    }
    Ok(())
}
