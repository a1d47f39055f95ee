// src/digest.rs

//! Short human labels for a script body.
//!
//! This is plain text processing over newline- and `;`-separated commands,
//! not shell parsing: quoting and control structures are not understood.

use std::sync::LazyLock;

use regex::Regex;

/// Commands that carry no information about what a script does.
pub const IGNORED_COMMANDS: &[&str] = &["cd"];

/// Display form used when every command was filtered out.
pub const EMPTY_DISPLAY: &str = "<empty>";

static COMMAND_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|[\n\r;]").expect("static separator regex"));

/// Iterate over the raw commands of a script (may be blank).
pub fn split_commands(script: &str) -> impl Iterator<Item = &str> {
    COMMAND_SEPARATOR.split(script)
}

/// Iterate over the commands that survive filtering, trimmed.
fn meaningful_commands(script: &str) -> impl Iterator<Item = &str> {
    split_commands(script).filter_map(|cmd| {
        let head = cmd.split_whitespace().next()?;
        if IGNORED_COMMANDS.contains(&head) {
            None
        } else {
            Some(cmd.trim())
        }
    })
}

/// First token of the first meaningful command, or `""` if there is none.
pub fn first_command(script: &str) -> &str {
    meaningful_commands(script)
        .next()
        .and_then(|cmd| cmd.split_whitespace().next())
        .unwrap_or("")
}

/// Meaningful commands joined with `"; "`, or [`EMPTY_DISPLAY`].
pub fn display_commands(script: &str) -> String {
    let commands: Vec<&str> = meaningful_commands(script).collect();
    if commands.is_empty() {
        return EMPTY_DISPLAY.to_string();
    }
    commands.join("; ")
}

/// Label shown in the tmux window while a script runs: the basename of its
/// first meaningful command.
pub fn status_label(script: &str) -> &str {
    let first = first_command(script);
    first.rsplit('/').next().unwrap_or(first)
}
