//! Concurrent hardening of a directory of Dockerfiles.

use anyhow::{Context, Result};
use dockharden_common::Error;
use dockharden_engine::{Hardened, Hardener};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// Counts reported after a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub hardened: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum FileOutcome {
    Hardened { changes: usize },
    Skipped,
}

/// Check if a file name follows a Dockerfile naming convention.
pub fn is_build_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name == "Dockerfile" || name.starts_with("Dockerfile.") || name.ends_with(".Dockerfile")
}

/// Harden every Dockerfile directly inside `dir`, writing results to `out`
/// under the same file names.
pub async fn harden_directory(
    dir: &Path,
    out: &Path,
    hardener: Arc<Hardener>,
) -> Result<BatchSummary> {
    let files = discover(dir).await?;
    if files.is_empty() {
        warn!("No Dockerfiles found in {:?}", dir);
        return Ok(BatchSummary::default());
    }

    tokio::fs::create_dir_all(out)
        .await
        .with_context(|| format!("Failed to create output directory {:?}", out))?;

    if same_directory(dir, out).await? {
        anyhow::bail!("Output directory must differ from the input directory");
    }

    let mut tasks = JoinSet::new();
    for path in files {
        let target = out.join(path.file_name().unwrap_or_default());
        let hardener = Arc::clone(&hardener);
        tasks.spawn(async move {
            let outcome = harden_file(&path, &target, hardener).await;
            (path, outcome)
        });
    }

    let mut summary = BatchSummary::default();
    while let Some(joined) = tasks.join_next().await {
        let (path, outcome) = joined.context("Hardening task panicked")?;
        match outcome {
            Ok(FileOutcome::Hardened { changes }) => {
                info!("Hardened {:?} ({} changes)", path, changes);
                summary.hardened += 1;
            }
            Ok(FileOutcome::Skipped) => {
                warn!("Skipped {:?}: no Dockerfile content", path);
                summary.skipped += 1;
            }
            Err(e) => {
                error!("Failed to harden {:?}: {:#}", path, e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

async fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory {:?}", dir))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && is_build_file(&path) {
            files.push(path);
        }
    }

    files.sort();
    debug!("Discovered {} Dockerfiles", files.len());
    Ok(files)
}

async fn harden_file(
    path: &Path,
    target: &Path,
    hardener: Arc<Hardener>,
) -> Result<FileOutcome> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;

    let hardened = match harden_blocking(hardener, content).await {
        Ok(hardened) => hardened,
        Err(e) if e.is_invalid_input() => return Ok(FileOutcome::Skipped),
        Err(e) => return Err(e.into()),
    };

    tokio::fs::write(target, &hardened.content)
        .await
        .with_context(|| format!("Failed to write {:?}", target))?;

    Ok(FileOutcome::Hardened {
        changes: hardened.report.changes.len(),
    })
}

/// Run the engine off the async workers. A panicked or cancelled task
/// becomes a processing failure for that file.
async fn harden_blocking(
    hardener: Arc<Hardener>,
    content: String,
) -> dockharden_common::Result<Hardened> {
    tokio::task::spawn_blocking(move || hardener.harden_checked(&content))
        .await
        .map_err(join_failure)?
}

fn join_failure(e: JoinError) -> Error {
    Error::Processing(format!("hardening task failed: {}", e))
}

async fn same_directory(a: &Path, b: &Path) -> Result<bool> {
    let a = tokio::fs::canonicalize(a).await?;
    let b = tokio::fs::canonicalize(b).await?;
    Ok(a == b)
}
