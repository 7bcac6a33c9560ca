//! Non-root user insertion post-pass.

use crate::config::HardenerConfig;
use crate::patterns;

/// The two synthesized lines: group and user creation, then the user switch.
pub fn user_block(config: &HardenerConfig) -> [String; 2] {
    [
        format!(
            "RUN groupadd -r {group} && useradd -r -g {group} {user}",
            group = config.group,
            user = config.user
        ),
        format!("USER {}", config.user),
    ]
}

/// Index of the first `COPY` line, or the end of the document.
pub fn insertion_point(lines: &[String]) -> usize {
    lines
        .iter()
        .position(|line| patterns::is_copy(line))
        .unwrap_or(lines.len())
}

/// Insert the user block and return the index of its first line.
pub fn insert_user_block(lines: &mut Vec<String>, config: &HardenerConfig) -> usize {
    let at = insertion_point(lines);
    let [create, switch] = user_block(config);
    lines.insert(at, create);
    lines.insert(at + 1, switch);
    at
}
