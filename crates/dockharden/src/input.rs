//! Reading submissions and writing results.

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Path value that selects stdin or stdout.
const STDIO_PATH: &str = "-";

/// Read a Dockerfile from a path, or from stdin for "-".
pub fn read_input(path: &Path) -> Result<String> {
    if is_stdio(path) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        return Ok(content);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

/// Write content verbatim to a file, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) if !is_stdio(path) => {
            std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Name of the input for log messages.
pub fn describe(path: &Path) -> String {
    if is_stdio(path) {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
}
