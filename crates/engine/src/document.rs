//! Build-file documents as ordered physical lines.

use dockharden_common::{Error, Result};

/// Input build-file split on `\n`. Empty lines, including a trailing one
/// left by a final newline, are kept as entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Join lines back with `\n`, adding nothing after the last one.
    pub fn join(lines: &[String]) -> String {
        lines.join("\n")
    }
}

/// Reject empty or whitespace-only submissions before they reach the engine.
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::InvalidInput(crate::MISSING_INPUT_MESSAGE.to_string()));
    }
    Ok(())
}
