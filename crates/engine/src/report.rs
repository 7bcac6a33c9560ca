//! Change report produced alongside the hardened document.

use dockharden_common::{hash, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rules that change the document, as labelled in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Replace a floating `latest` base-image tag with a pinned one.
    PinBaseImage,
    /// Chain cache cleanup onto the install that follows a refresh.
    CleanPackageCache,
    /// Synthesize a non-root user block.
    InsertNonRootUser,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::PinBaseImage => "pin_base_image",
            RuleId::CleanPackageCache => "clean_package_cache",
            RuleId::InsertNonRootUser => "insert_non_root_user",
        }
    }

    /// Human-readable summary of what the rule does to a file.
    pub fn description(&self) -> &'static str {
        match self {
            RuleId::PinBaseImage => "Pinned floating base-image tag",
            RuleId::CleanPackageCache => "Added package cache cleanup",
            RuleId::InsertNonRootUser => "Added non-root user",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One modification made to the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub rule: RuleId,
    /// 1-based line number: the source line for rewrites, the output line of
    /// the first inserted line for insertions.
    pub line: usize,
    /// Original text, empty for insertions.
    pub before: String,
    pub after: String,
}

/// Summary of one hardening call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardenReport {
    pub changes: Vec<Change>,
    /// Whether the input declared its own group or user.
    pub non_root_user_declared: bool,
    /// 0-based output index where the user block was inserted.
    pub user_block_inserted_at: Option<usize>,
    pub input_lines: usize,
    pub output_lines: usize,
}

impl HardenReport {
    /// Number of changes made by `rule`.
    pub fn count(&self, rule: RuleId) -> usize {
        self.changes.iter().filter(|c| c.rule == rule).count()
    }

    /// True if the output is byte-identical to the input.
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Report as written to disk: the change list plus document fingerprints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub report_id: String,
    pub generated_at: Timestamp,
    pub input_sha256: String,
    pub output_sha256: String,
    #[serde(flatten)]
    pub report: HardenReport,
}

impl ReportDocument {
    pub fn new(original: &str, hardened: &str, report: HardenReport) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Timestamp::now(),
            input_sha256: hash::sha256_str(original),
            output_sha256: hash::sha256_str(hardened),
            report,
        }
    }

    pub fn to_json(&self) -> dockharden_common::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
