//! Per-line rewrite rules.
//!
//! Rules run in a fixed order against each line. A rule may rewrite the
//! line, flip scan state, or stop evaluation so the line is emitted as is.

use crate::config::HardenerConfig;
use crate::patterns::{self, FROM_LATEST_PATTERN, LATEST_TAG_SUFFIX};
use crate::report::RuleId;
use crate::state::ScanState;
use crate::tags::TagTable;
use tracing::{debug, trace};

/// What the caller should do after a rule ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Evaluate the next rule.
    Continue,
    /// Emit the line now and skip the remaining rules.
    Emit,
}

/// Line rules in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRule {
    PinBaseImage,
    DetectNonRootUser,
    OpenPackageInstall,
    CleanPackageCache,
}

const RULES: [LineRule; 4] = [
    LineRule::PinBaseImage,
    LineRule::DetectNonRootUser,
    LineRule::OpenPackageInstall,
    LineRule::CleanPackageCache,
];

/// Effect of one rule on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Outcome {
    flow: Flow,
    /// Reported change, set only when the line text was rewritten.
    change: Option<RuleId>,
}

impl Outcome {
    const INERT: Outcome = Outcome {
        flow: Flow::Continue,
        change: None,
    };
    const EMIT: Outcome = Outcome {
        flow: Flow::Emit,
        change: None,
    };

    fn rewrote(rule: RuleId) -> Self {
        Outcome {
            flow: Flow::Continue,
            change: Some(rule),
        }
    }
}

/// A line after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub text: String,
    /// Rules that changed the text, in application order.
    pub rewritten_by: Vec<RuleId>,
}

/// Applies the ordered rule list to individual lines.
#[derive(Debug, Clone)]
pub struct Classifier {
    tags: TagTable,
    cleanup_suffix: String,
}

impl Classifier {
    pub fn new(config: &HardenerConfig) -> Self {
        Self {
            tags: TagTable::from_config(config),
            cleanup_suffix: config.cleanup_suffix(),
        }
    }

    /// Run every rule against `line`, updating `state`.
    pub fn classify(&self, line: &str, state: &mut ScanState) -> Classified {
        let mut text = line.to_string();
        let mut rewritten_by = Vec::new();

        for rule in RULES {
            let outcome = self.apply(rule, &mut text, state);
            if let Some(change) = outcome.change {
                rewritten_by.push(change);
            }
            if outcome.flow == Flow::Emit {
                break;
            }
        }

        Classified { text, rewritten_by }
    }

    fn apply(&self, rule: LineRule, line: &mut String, state: &mut ScanState) -> Outcome {
        match rule {
            LineRule::PinBaseImage => self.pin_base_image(line),
            LineRule::DetectNonRootUser => detect_non_root_user(line, state),
            LineRule::OpenPackageInstall => open_package_install(line, state),
            LineRule::CleanPackageCache => self.clean_package_cache(line, state),
        }
    }

    fn pin_base_image(&self, line: &mut String) -> Outcome {
        let Some(caps) = FROM_LATEST_PATTERN.captures(line.as_str()) else {
            return Outcome::INERT;
        };
        let Some(image) = caps.get(1) else {
            return Outcome::INERT;
        };

        let tag = self.tags.lookup(image.as_str());
        let tag_start = image.end();
        let tag_end = tag_start + LATEST_TAG_SUFFIX.len();
        let replacement = format!(":{}", tag);
        debug!("Pinning {}:latest to {}", image.as_str(), replacement);

        line.replace_range(tag_start..tag_end, &replacement);
        Outcome::rewrote(RuleId::PinBaseImage)
    }

    fn clean_package_cache(&self, line: &mut String, state: &mut ScanState) -> Outcome {
        if !state.package_install_open() || !patterns::is_package_install(line) {
            return Outcome::INERT;
        }

        debug!("Appending package cache cleanup");
        line.push_str(&self.cleanup_suffix);
        state.close_package_install();
        Outcome::rewrote(RuleId::CleanPackageCache)
    }
}

fn detect_non_root_user(line: &str, state: &mut ScanState) -> Outcome {
    if patterns::is_user_creation(line) {
        trace!("Non-root user declared: {}", line);
        state.declare_non_root_user();
    }
    Outcome::INERT
}

fn open_package_install(line: &str, state: &mut ScanState) -> Outcome {
    if !patterns::is_package_index_refresh(line) {
        return Outcome::INERT;
    }

    if !state.open_package_install() {
        trace!("Package install block already open");
    }
    Outcome::EMIT
}
