//! Typed parsing for the line-oriented command vocabulary.
//!
//! Each line the model appends after `SYSTEM_COMMANDS` is tokenized with
//! shell-style quoting rules, so paths with spaces work when quoted. Parsing
//! is pure; containment checks and execution live in [`crate::io::images`].

use std::fmt;

/// A file-management command requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Delete a regular file.
    Remove { path: String },
    /// Move or rename a file, replacing any existing destination.
    Move { src: String, dst: String },
    /// Create a directory (and missing parents); idempotent.
    MakeDirectory { path: String },
    /// Remove a directory that must be empty.
    RemoveEmptyDirectory { path: String },
}

/// Why a command line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Shell-style tokenization failed (e.g. an unbalanced quote).
    BadQuoting,
    /// The first token is not a supported verb.
    UnknownVerb(String),
    /// The verb is known but the argument count is wrong.
    WrongArgCount {
        verb: &'static str,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadQuoting => write!(f, "unbalanced quoting"),
            ParseError::UnknownVerb(verb) => write!(f, "unsupported verb '{verb}'"),
            ParseError::WrongArgCount {
                verb,
                expected,
                got,
            } => write!(f, "{verb} expects {expected} argument(s), got {got}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse one command line with shell-style quoting rules.
///
/// Returns `Ok(None)` for lines that tokenize to nothing.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let tokens = shlex::split(line).ok_or(ParseError::BadQuoting)?;
    let Some((verb, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match verb.as_str() {
        "remove" | "rm" | "delete" => Command::Remove {
            path: one_arg("remove", args)?,
        },
        "move" | "mv" | "rename" => {
            let (src, dst) = two_args("move", args)?;
            Command::Move { src, dst }
        }
        "make-directory" | "mkdir" => Command::MakeDirectory {
            path: one_arg("make-directory", args)?,
        },
        "remove-empty-directory" | "rmdir" => Command::RemoveEmptyDirectory {
            path: one_arg("remove-empty-directory", args)?,
        },
        other => return Err(ParseError::UnknownVerb(other.to_string())),
    };

    Ok(Some(command))
}

fn one_arg(verb: &'static str, args: &[String]) -> Result<String, ParseError> {
    match args {
        [path] => Ok(path.clone()),
        _ => Err(ParseError::WrongArgCount {
            verb,
            expected: 1,
            got: args.len(),
        }),
    }
}

fn two_args(verb: &'static str, args: &[String]) -> Result<(String, String), ParseError> {
    match args {
        [src, dst] => Ok((src.clone(), dst.clone())),
        _ => Err(ParseError::WrongArgCount {
            verb,
            expected: 2,
            got: args.len(),
        }),
    }
}
