//! Best-effort parser for the model's delimiter-based response format.
//!
//! The model replies with a sequence of `--- <label> ---` blocks. A label is
//! either a managed file path, the [`NO_CHANGES`] sentinel, or the
//! [`SYSTEM_COMMANDS`] sentinel that introduces a trailing command list.
//!
//! The parser is deliberately tolerant: markers that deviate from the
//! expected shape simply yield fewer matched blocks, and zero blocks is a
//! valid parse meaning "nothing to do". This mirrors how models actually
//! drift from delimiter conventions; strict validation would turn recoverable
//! sloppiness into fatal errors.

use std::sync::LazyLock;

use regex::Regex;

/// Sentinel label meaning the model made no file changes.
pub const NO_CHANGES: &str = "NO_CHANGES";
/// Sentinel label introducing the trailing command list.
pub const SYSTEM_COMMANDS: &str = "SYSTEM_COMMANDS";

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"---\s*(.*?)\s*---").expect("block marker regex should be valid")
});

static COMMANDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"---\s*SYSTEM_COMMANDS\s*---").expect("command marker regex should be valid")
});

/// A labeled chunk of the model's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Label between the delimiters, trimmed.
    pub label: String,
    /// Text between this marker and the next, trimmed.
    pub body: String,
}

/// A parsed model response: file blocks plus optional command lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Blocks from the files section, in response order. Never contains the
    /// sentinel labels.
    pub blocks: Vec<Block>,
    /// Non-blank lines after the `SYSTEM_COMMANDS` marker.
    pub command_lines: Vec<String>,
    /// Whether the files section carried the `NO_CHANGES` sentinel.
    pub no_changes: bool,
}

/// Parse a raw model response into typed blocks and command lines.
///
/// Everything before the first `SYSTEM_COMMANDS` marker is the files section;
/// everything after is one command per line, blank lines ignored.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let (files_section, commands_section) = split_command_section(raw);

    let mut blocks = parse_blocks(files_section);
    let no_changes = blocks.iter().any(|block| block.label == NO_CHANGES);
    blocks.retain(|block| block.label != NO_CHANGES);

    let command_lines = commands_section
        .map(|section| {
            section
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ParsedResponse {
        blocks,
        command_lines,
        no_changes,
    }
}

/// Split the response at the `SYSTEM_COMMANDS` marker, if present.
fn split_command_section(raw: &str) -> (&str, Option<&str>) {
    match COMMANDS_RE.find(raw) {
        Some(marker) => (&raw[..marker.start()], Some(&raw[marker.end()..])),
        None => (raw, None),
    }
}

/// Split a files section on repeating `--- <label> ---` markers.
///
/// Text before the first marker is ignored. A marker with an empty label
/// still terminates the preceding block but produces no block of its own, so
/// malformed delimiters can silently drop the text that follows them. This is
/// accepted best-effort behavior, not an error.
pub fn parse_blocks(section: &str) -> Vec<Block> {
    let matches: Vec<_> = BLOCK_RE.captures_iter(section).collect();
    let mut blocks = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let label = caps.get(1).expect("marker capture").as_str().trim();
        if label.is_empty() {
            continue;
        }
        let start = caps.get(0).expect("marker match").end();
        let end = matches
            .get(i + 1)
            .map(|next| next.get(0).expect("marker match").start())
            .unwrap_or(section.len());

        blocks.push(Block {
            label: label.to_string(),
            body: section[start..end].trim().to_string(),
        });
    }

    blocks
}
