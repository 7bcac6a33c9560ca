//! Line patterns recognized by the rewrite rules.
//!
//! All matching is case-sensitive and anchored at the start of the line.

use regex::Regex;
use std::sync::LazyLock;

/// Base-image directive whose argument carries the floating `latest` tag.
///
/// Capture 1 is the image reference without its tag. The tag must end at
/// whitespace or end of line so `:latest-alpine` style tags are left alone.
pub static FROM_LATEST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^FROM\s+(\S+):latest(?:\s|$)").unwrap());

/// Literal tag suffix replaced by base-image pinning.
pub const LATEST_TAG_SUFFIX: &str = ":latest";

/// Commands that declare a group or user.
pub const USER_CREATION_PREFIXES: [&str; 3] = ["RUN groupadd", "RUN addgroup", "RUN adduser"];

/// Package index refresh.
pub const PACKAGE_INDEX_REFRESH_PREFIX: &str = "RUN apt-get update";

/// Package installation.
pub const PACKAGE_INSTALL_PREFIX: &str = "RUN apt-get install";

/// File-copy directive; the user block goes in front of the first one.
pub const COPY_PREFIX: &str = "COPY";

/// Continuation placed between the install command and each cleanup step.
pub const CONTINUATION: &str = " \\\n    && ";

/// Check if a line declares a group or user.
pub fn is_user_creation(line: &str) -> bool {
    USER_CREATION_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Check if a line refreshes the package index.
pub fn is_package_index_refresh(line: &str) -> bool {
    line.starts_with(PACKAGE_INDEX_REFRESH_PREFIX)
}

/// Check if a line installs packages.
pub fn is_package_install(line: &str) -> bool {
    line.starts_with(PACKAGE_INSTALL_PREFIX)
}

/// Check if a line copies files into the image.
pub fn is_copy(line: &str) -> bool {
    line.starts_with(COPY_PREFIX)
}

/// Leading instruction keyword of a line, if any.
pub fn instruction_keyword(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}
