//! dockharden engine - rewrite Dockerfiles into hardened variants.
//!
//! The engine scans a build-file line by line, pins floating base-image
//! tags, appends package-cache cleanup to `apt-get install` lines that follow
//! an index refresh, and inserts a non-root user block when the file never
//! declares one. It performs no I/O and keeps no state between calls.

pub mod classifier;
pub mod config;
pub mod document;
pub mod hardener;
pub mod insertion;
pub mod patterns;
pub mod report;
pub mod state;
pub mod tags;

pub use config::{HardenerConfig, TagRule};
pub use document::Document;
pub use hardener::{harden, Hardened, Hardener};
pub use report::{Change, HardenReport, ReportDocument, RuleId};
pub use state::ScanState;

/// Message shown when a submission carries no build-file content.
pub const MISSING_INPUT_MESSAGE: &str = "No Dockerfile content provided";

/// Message shown for any failure that is not the caller's fault.
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process Dockerfile";
