//! Top-level orchestration: split, scan, insert, join.

use crate::classifier::Classifier;
use crate::config::HardenerConfig;
use crate::document::{self, Document};
use crate::insertion;
use crate::patterns;
use crate::report::{Change, HardenReport, RuleId};
use crate::state::ScanState;
use dockharden_common::Result;
use tracing::{debug, trace};

/// Hardened text and what was changed to produce it.
#[derive(Debug, Clone)]
pub struct Hardened {
    pub content: String,
    pub report: HardenReport,
}

/// The rewrite engine. Holds only immutable configuration, so one instance
/// can serve any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct Hardener {
    config: HardenerConfig,
    classifier: Classifier,
}

impl Hardener {
    /// Create a hardener with the stock rule set.
    pub fn new() -> Self {
        Self::with_config(HardenerConfig::default())
    }

    /// Create a hardener with custom configuration.
    pub fn with_config(config: HardenerConfig) -> Self {
        let classifier = Classifier::new(&config);
        Self { config, classifier }
    }

    pub fn config(&self) -> &HardenerConfig {
        &self.config
    }

    /// Harden a build-file. Any text is accepted; unrecognized lines pass
    /// through unchanged.
    pub fn harden(&self, content: &str) -> Hardened {
        let document = Document::parse(content);
        let mut state = ScanState::new();
        let mut lines = Vec::with_capacity(document.len() + 2);
        let mut report = HardenReport {
            input_lines: document.len(),
            ..Default::default()
        };

        for (idx, line) in document.lines().iter().enumerate() {
            trace!(
                "Line {}: {:?}",
                idx + 1,
                patterns::instruction_keyword(line).unwrap_or("")
            );
            let classified = self.classifier.classify(line, &mut state);
            for rule in &classified.rewritten_by {
                report.changes.push(Change {
                    rule: *rule,
                    line: idx + 1,
                    before: line.clone(),
                    after: classified.text.clone(),
                });
            }
            lines.push(classified.text);
        }

        report.non_root_user_declared = state.non_root_user_declared();
        if !state.non_root_user_declared() {
            let at = insertion::insert_user_block(&mut lines, &self.config);
            debug!("Inserted non-root user block at line {}", at + 1);
            report.user_block_inserted_at = Some(at);
            report.changes.push(Change {
                rule: RuleId::InsertNonRootUser,
                line: at + 1,
                before: String::new(),
                after: Document::join(&lines[at..at + 2]),
            });
        }

        report.output_lines = lines.len();
        debug!(
            "Hardened {} lines into {} with {} changes",
            report.input_lines,
            report.output_lines,
            report.changes.len()
        );

        Hardened {
            content: Document::join(&lines),
            report,
        }
    }

    /// Validate the submission, then harden it.
    pub fn harden_checked(&self, content: &str) -> Result<Hardened> {
        document::validate_content(content)?;
        Ok(self.harden(content))
    }
}

impl Default for Hardener {
    fn default() -> Self {
        Self::new()
    }
}

/// Harden a build-file with the stock rule set.
pub fn harden(content: &str) -> String {
    Hardener::new().harden(content).content
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const USER_LINE: &str = "RUN groupadd -r appuser && useradd -r -g appuser appuser";

    #[test]
    fn test_full_document() {
        let input = "FROM node:latest\n\
                     WORKDIR /app\n\
                     RUN apt-get update\n\
                     RUN apt-get install -y curl\n\
                     COPY package.json .\n\
                     RUN npm ci\n\
                     COPY . .\n\
                     CMD [\"node\", \"server.js\"]";
        let expected = "FROM node:18-slim\n\
                        WORKDIR /app\n\
                        RUN apt-get update\n\
                        RUN apt-get install -y curl \\\n    && apt-get clean \\\n    && rm -rf /var/lib/apt/lists/*\n\
                        RUN groupadd -r appuser && useradd -r -g appuser appuser\n\
                        USER appuser\n\
                        COPY package.json .\n\
                        RUN npm ci\n\
                        COPY . .\n\
                        CMD [\"node\", \"server.js\"]";
        assert_eq!(harden(input), expected);
    }

    #[test]
    fn test_python_gets_specific_tag() {
        let out = harden("FROM python:latest\nRUN adduser app");
        assert_eq!(out, "FROM python:3.9-slim\nRUN adduser app");
    }

    #[test]
    fn test_ubuntu_gets_lts() {
        let out = harden("FROM ubuntu:latest\nRUN groupadd app");
        assert_eq!(out, "FROM ubuntu:20.04\nRUN groupadd app");
    }

    #[test]
    fn test_declared_user_suppresses_insertion() {
        for creation in ["RUN adduser app", "RUN groupadd app", "RUN addgroup app"] {
            let input = format!("FROM node:20\n{}\nCOPY . /app", creation);
            let hardened = Hardener::new().harden(&input);
            assert_eq!(hardened.content, input);
            assert!(hardened.report.non_root_user_declared);
            assert_eq!(hardened.report.user_block_inserted_at, None);
            assert!(hardened.report.is_unchanged());
        }
    }

    #[test]
    fn test_user_declared_after_copy_still_counts() {
        let input = "FROM node:20\nCOPY . /app\nRUN adduser app";
        assert_eq!(harden(input), input);
    }

    #[test]
    fn test_block_appended_without_copy() {
        let out = harden("FROM alpine:3.19\nCMD [\"sh\"]");
        assert_eq!(
            out,
            format!("FROM alpine:3.19\nCMD [\"sh\"]\n{}\nUSER appuser", USER_LINE)
        );
    }

    #[test]
    fn test_block_goes_after_trailing_empty_line() {
        let out = harden("FROM alpine:3.19\n");
        assert_eq!(out, format!("FROM alpine:3.19\n\n{}\nUSER appuser", USER_LINE));
    }

    #[test]
    fn test_block_inserted_once_before_first_copy() {
        let hardened = Hardener::new().harden("FROM node:20\nCOPY a /a\nCOPY b /b");
        let out = &hardened.content;
        assert_eq!(out.matches(USER_LINE).count(), 1);
        assert_eq!(out.matches("USER appuser").count(), 1);
        assert_eq!(hardened.report.user_block_inserted_at, Some(1));
        assert!(out.starts_with(&format!("FROM node:20\n{}\nUSER appuser\nCOPY a /a", USER_LINE)));
    }

    #[test]
    fn test_unrecognized_lines_pass_through() {
        let input = "this is not\n\n  a dockerfile at all ::: latest\nRUN adduser x";
        assert_eq!(harden(input), input);
    }

    #[test]
    fn test_output_never_shorter() {
        let inputs = [
            "FROM node:latest",
            "",
            "RUN adduser a\n\n\n",
            "RUN apt-get update\nRUN apt-get install -y git\nCOPY . .",
        ];
        for input in inputs {
            let hardened = Hardener::new().harden(input);
            assert!(hardened.report.output_lines >= hardened.report.input_lines);
            assert!(
                Document::parse(&hardened.content).len() >= Document::parse(input).len()
            );
        }
    }

    #[test]
    fn test_report_lists_changes() {
        let hardened = Hardener::new().harden(
            "FROM python:latest\nRUN apt-get update\nRUN apt-get install -y gcc\nCOPY . .",
        );
        let report = &hardened.report;
        assert_eq!(report.count(RuleId::PinBaseImage), 1);
        assert_eq!(report.count(RuleId::CleanPackageCache), 1);
        assert_eq!(report.count(RuleId::InsertNonRootUser), 1);
        assert_eq!(report.changes[0].line, 1);
        assert_eq!(report.changes[0].before, "FROM python:latest");
        assert_eq!(report.changes[0].after, "FROM python:3.9-slim");
        assert_eq!(report.changes[1].line, 3);
        assert_eq!(report.changes[2].line, 4);
        assert_eq!(report.changes[2].after, format!("{}\nUSER appuser", USER_LINE));
        assert_eq!(report.input_lines, 4);
        assert_eq!(report.output_lines, 6);
    }

    #[test]
    fn test_second_application() {
        let hardener = Hardener::new();
        let once = hardener.harden(
            "FROM node:latest\nRUN apt-get update\nRUN apt-get install -y curl\nCOPY . .",
        );
        let twice = hardener.harden(&once.content);

        // The synthesized groupadd line is recognized, so no second user block.
        assert!(twice.report.non_root_user_declared);
        assert_eq!(twice.content.matches(USER_LINE).count(), 1);
        // The install line still follows the refresh after re-splitting, so
        // the cleanup is chained a second time.
        assert_eq!(twice.content.matches("&& apt-get clean").count(), 2);
        assert_ne!(twice.content, once.content);
    }

    #[test]
    fn test_custom_config_flows_through() {
        let config = HardenerConfig {
            user: "web".to_string(),
            group: "web".to_string(),
            default_tag: "lts-slim".to_string(),
            package_cleanup: vec!["apt-get clean".to_string()],
            ..Default::default()
        };
        let hardener = Hardener::with_config(config);
        let out = hardener
            .harden("FROM node:latest\nRUN apt-get update\nRUN apt-get install -y curl")
            .content;
        assert_eq!(
            out,
            "FROM node:lts-slim\n\
             RUN apt-get update\n\
             RUN apt-get install -y curl \\\n    && apt-get clean\n\
             RUN groupadd -r web && useradd -r -g web web\n\
             USER web"
        );
    }

    #[test]
    fn test_harden_checked_rejects_blank_input() {
        let hardener = Hardener::new();
        assert!(hardener.harden_checked("").unwrap_err().is_invalid_input());
        assert!(hardener.harden_checked("  \n\t").unwrap_err().is_invalid_input());
        assert!(hardener.harden_checked("FROM scratch").is_ok());
    }
}
