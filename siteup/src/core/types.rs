//! Shared outcome types for a single update run.
//!
//! These types define the structured report produced by
//! [`crate::update::run_update`]. Every skip decision is recorded here so
//! callers can observe the best-effort apply behavior instead of scraping
//! console output.

use serde::{Deserialize, Serialize};

/// What happened to one response block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileDisposition {
    /// Content differed and the file was overwritten.
    Written,
    /// Content was byte-identical; nothing written.
    Unchanged,
    /// Label does not name a managed page; block ignored.
    UnknownLabel,
    /// The write failed; error text preserved.
    Failed { error: String },
}

/// Outcome for one response block, keyed by its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub label: String,
    pub disposition: FileDisposition,
}

/// What happened to one command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandDisposition {
    /// The command ran to completion.
    Applied,
    /// The command was refused before touching the filesystem.
    Rejected { reason: String },
    /// The command passed its preconditions but failed during execution.
    Failed { error: String },
}

/// Outcome for one command line, preserving the raw line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub line: String,
    pub disposition: CommandDisposition,
}

/// Structured result of one update run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    /// Whether the model declared `NO_CHANGES` for the files section.
    pub no_changes: bool,
    /// Per-block outcomes, in response order.
    pub files: Vec<FileOutcome>,
    /// Per-command outcomes, in response order.
    pub commands: Vec<CommandOutcome>,
}

impl UpdateReport {
    /// Number of blocks that resulted in a write.
    pub fn written(&self) -> usize {
        self.files
            .iter()
            .filter(|file| matches!(file.disposition, FileDisposition::Written))
            .count()
    }

    /// Number of commands that ran to completion.
    pub fn applied(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command.disposition, CommandDisposition::Applied))
            .count()
    }
}
