//! Image-directory operations gated by a containment check.
//!
//! Every mutating command the model requests is resolved against the images
//! root before execution. A path is inside the root iff its canonicalized
//! (symlink-resolved, absolute) form equals the canonical root or starts with
//! it plus a path separator. The deepest existing ancestor is canonicalized,
//! so a symlink inside the root cannot point an operation outside it even
//! when the final component does not exist yet.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use crate::core::command::{Command, parse_command};
use crate::core::types::{CommandDisposition, CommandOutcome};

/// List asset paths under the images root, relative to it, sorted.
///
/// A missing root yields an empty list so prompts simply omit the section.
pub fn list_assets(images_root: &Path) -> Result<Vec<String>> {
    if !images_root.is_dir() {
        return Ok(Vec::new());
    }
    let mut assets = Vec::new();
    collect_assets(images_root, images_root, &mut assets)?;
    assets.sort();
    Ok(assets)
}

fn collect_assets(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry.context("read dir entry")?;
        let path = entry.path();
        if path.is_dir() {
            collect_assets(root, &path, out)?;
        } else {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            out.push(rel.to_string_lossy().to_string());
        }
    }
    Ok(())
}

/// Execute each command line against the images root.
///
/// Commands are independent and order-preserving: a rejected or failed
/// command never stops the rest of the batch, and every line's outcome is
/// recorded.
pub fn execute_commands(images_root: &Path, lines: &[String]) -> Vec<CommandOutcome> {
    lines
        .iter()
        .map(|line| CommandOutcome {
            line: line.clone(),
            disposition: execute_line(images_root, line),
        })
        .collect()
}

fn execute_line(images_root: &Path, line: &str) -> CommandDisposition {
    let command = match parse_command(line) {
        Ok(Some(command)) => command,
        Ok(None) => {
            return CommandDisposition::Rejected {
                reason: "empty command".to_string(),
            };
        }
        Err(err) => {
            warn!(line, err = %err, "rejecting malformed command");
            return CommandDisposition::Rejected {
                reason: err.to_string(),
            };
        }
    };

    match run_command(images_root, &command) {
        Ok(()) => CommandDisposition::Applied,
        Err(CommandError::Rejected(reason)) => {
            warn!(line, reason, "rejecting command");
            CommandDisposition::Rejected { reason }
        }
        Err(CommandError::Io(err)) => {
            warn!(line, err = %err, "command failed");
            CommandDisposition::Failed {
                error: format!("{err:#}"),
            }
        }
    }
}

enum CommandError {
    /// Precondition failed; the filesystem was not touched.
    Rejected(String),
    /// Preconditions held but execution failed.
    Io(anyhow::Error),
}

fn run_command(images_root: &Path, command: &Command) -> Result<(), CommandError> {
    match command {
        Command::Remove { path } => {
            let target = contained(images_root, path)?;
            if !target.is_file() {
                return Err(CommandError::Rejected(format!(
                    "{path} is not an existing regular file"
                )));
            }
            fs::remove_file(&target)
                .with_context(|| format!("remove {}", target.display()))
                .map_err(CommandError::Io)?;
            info!(path = %target.display(), "removed file");
        }
        Command::Move { src, dst } => {
            let from = contained(images_root, src)?;
            let to = contained(images_root, dst)?;
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create parent {}", parent.display()))
                    .map_err(CommandError::Io)?;
            }
            fs::rename(&from, &to)
                .with_context(|| format!("move {} to {}", from.display(), to.display()))
                .map_err(CommandError::Io)?;
            info!(from = %from.display(), to = %to.display(), "moved file");
        }
        Command::MakeDirectory { path } => {
            let target = contained(images_root, path)?;
            fs::create_dir_all(&target)
                .with_context(|| format!("create directory {}", target.display()))
                .map_err(CommandError::Io)?;
            info!(path = %target.display(), "ensured directory");
        }
        Command::RemoveEmptyDirectory { path } => {
            let target = contained(images_root, path)?;
            if !target.is_dir() {
                return Err(CommandError::Rejected(format!(
                    "{path} is not an existing directory"
                )));
            }
            fs::remove_dir(&target)
                .with_context(|| format!("remove directory {}", target.display()))
                .map_err(CommandError::Io)?;
            info!(path = %target.display(), "removed directory");
        }
    }
    Ok(())
}

fn contained(root: &Path, candidate: &str) -> Result<PathBuf, CommandError> {
    resolve_within(root, candidate).map_err(|err| CommandError::Rejected(format!("{err:#}")))
}

/// Resolve `candidate` and require it to stay inside `root`.
///
/// The root must exist. The candidate may not exist yet (move destinations,
/// new directories): `.`/`..` segments are folded lexically, then the deepest
/// existing ancestor is canonicalized and the remaining components appended.
pub fn resolve_within(root: &Path, candidate: &str) -> Result<PathBuf> {
    let root = fs::canonicalize(root)
        .with_context(|| format!("resolve images root {}", root.display()))?;
    let absolute = to_absolute(Path::new(candidate))?;
    let resolved = canonicalize_existing_prefix(&normalize_lexically(&absolute))
        .with_context(|| format!("resolve {candidate}"))?;
    if resolved.starts_with(&root) {
        debug!(path = %resolved.display(), "path accepted inside images root");
        Ok(resolved)
    } else {
        Err(anyhow!("{candidate} resolves outside the images root"))
    }
}

fn to_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("resolve current directory")?;
    Ok(cwd.join(path))
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// `..` never pops past the filesystem root.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            other => components.push(other),
        }
    }
    components.iter().collect()
}

/// Canonicalize the deepest existing ancestor, then append the rest.
fn canonicalize_existing_prefix(path: &Path) -> Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut tail = Vec::new();
    loop {
        match fs::canonicalize(&existing) {
            Ok(resolved) => {
                let mut out = resolved;
                for part in tail.iter().rev() {
                    out.push(part);
                }
                return Ok(out);
            }
            Err(_) => {
                let name = existing
                    .file_name()
                    .ok_or_else(|| anyhow!("no existing ancestor for {}", path.display()))?
                    .to_os_string();
                tail.push(name);
                existing = existing
                    .parent()
                    .ok_or_else(|| anyhow!("no existing ancestor for {}", path.display()))?
                    .to_path_buf();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| (*line).to_string()).collect()
    }

    #[test]
    fn lists_assets_recursively_and_sorted() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");
        fs::create_dir_all(root.join("gallery")).expect("mkdir");
        fs::write(root.join("zebra.png"), [0u8]).expect("write");
        fs::write(root.join("gallery/alps.jpg"), [0u8]).expect("write");

        let assets = list_assets(&root).expect("list");

        assert_eq!(assets, vec!["gallery/alps.jpg", "zebra.png"]);
    }

    #[test]
    fn missing_root_lists_no_assets() {
        let temp = tempfile::tempdir().expect("tempdir");
        let assets = list_assets(&temp.path().join("nope")).expect("list");
        assert!(assets.is_empty());
    }

    #[test]
    fn accepts_root_and_descendants_only() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(temp.path().join("secret.txt"), "s").expect("write");

        let inside = root.join("a.png");
        assert!(resolve_within(&root, inside.to_str().expect("utf8")).is_ok());
        assert!(resolve_within(&root, root.to_str().expect("utf8")).is_ok());

        let escape = root.join("../secret.txt");
        assert!(resolve_within(&root, escape.to_str().expect("utf8")).is_err());
    }

    #[test]
    fn dotdot_inside_root_is_folded_not_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");
        fs::create_dir_all(root.join("gallery")).expect("mkdir");

        let candidate = root.join("gallery/../a.png");
        let resolved = resolve_within(&root, candidate.to_str().expect("utf8")).expect("resolve");

        assert_eq!(resolved.file_name().expect("name"), "a.png");
        assert_eq!(resolved.parent(), Some(fs::canonicalize(&root).expect("canon").as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_root_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");
        let outside = temp.path().join("outside");
        fs::create_dir_all(&root).expect("mkdir root");
        fs::create_dir_all(&outside).expect("mkdir outside");
        std::os::unix::fs::symlink(&outside, root.join("link")).expect("symlink");

        // The link itself exists inside the root, but it resolves outside.
        let through_link = root.join("link/a.png");
        assert!(resolve_within(&root, through_link.to_str().expect("utf8")).is_err());
    }

    /// An in-root source with an out-of-root destination rejects the move as
    /// a whole.
    #[test]
    fn move_with_escaping_destination_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");
        fs::create_dir_all(&root).expect("mkdir");
        fs::create_dir_all(temp.path().join("secrets")).expect("mkdir secrets");
        fs::write(root.join("a.png"), [0u8]).expect("write");

        let line = format!(
            "move {} {}",
            root.join("a.png").display(),
            root.join("../secrets/a.png").display()
        );
        let outcomes = execute_commands(&root, &lines(&[&line]));

        assert!(matches!(
            outcomes[0].disposition,
            CommandDisposition::Rejected { .. }
        ));
        assert!(root.join("a.png").exists(), "source must stay put");
        assert!(!temp.path().join("secrets/a.png").exists());
    }

    #[test]
    fn move_creates_destination_parents_and_replaces() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("a.png"), "new").expect("write");

        let line = format!(
            "move {} {}",
            root.join("a.png").display(),
            root.join("gallery/b.png").display()
        );
        let outcomes = execute_commands(&root, &lines(&[&line]));

        assert_eq!(outcomes[0].disposition, CommandDisposition::Applied);
        assert!(!root.join("a.png").exists());
        let moved = fs::read_to_string(root.join("gallery/b.png")).expect("read");
        assert_eq!(moved, "new");
    }

    #[test]
    fn remove_requires_an_existing_regular_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");
        fs::create_dir_all(root.join("subdir")).expect("mkdir");

        let missing = format!("remove {}", root.join("nope.png").display());
        let directory = format!("remove {}", root.join("subdir").display());
        let outcomes = execute_commands(&root, &lines(&[&missing, &directory]));

        assert!(matches!(
            outcomes[0].disposition,
            CommandDisposition::Rejected { .. }
        ));
        assert!(matches!(
            outcomes[1].disposition,
            CommandDisposition::Rejected { .. }
        ));
        assert!(root.join("subdir").is_dir());
    }

    /// mkdir then rmdir succeeds on an empty directory; rmdir on a non-empty
    /// directory is reported, not fatal.
    #[test]
    fn mkdir_rmdir_scenario() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");
        fs::create_dir_all(&root).expect("mkdir");

        let gallery = root.join("gallery");
        let mk = format!("mkdir {}", gallery.display());
        let rm = format!("rmdir {}", gallery.display());

        let outcomes = execute_commands(&root, &lines(&[&mk, &rm]));
        assert_eq!(outcomes[0].disposition, CommandDisposition::Applied);
        assert_eq!(outcomes[1].disposition, CommandDisposition::Applied);
        assert!(!gallery.exists());

        // Recreate with contents: rmdir must fail and leave it intact.
        fs::create_dir_all(&gallery).expect("mkdir");
        fs::write(gallery.join("keep.png"), [0u8]).expect("write");
        let outcomes = execute_commands(&root, &lines(&[&rm]));
        assert!(matches!(
            outcomes[0].disposition,
            CommandDisposition::Failed { .. }
        ));
        assert!(gallery.join("keep.png").exists());
    }

    #[test]
    fn mkdir_is_idempotent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");
        fs::create_dir_all(root.join("gallery")).expect("mkdir");

        let line = format!("mkdir {}", root.join("gallery").display());
        let outcomes = execute_commands(&root, &lines(&[&line]));

        assert_eq!(outcomes[0].disposition, CommandDisposition::Applied);
    }

    /// Verifies command isolation: an invalid middle command does not stop
    /// its neighbors.
    #[test]
    fn bad_command_does_not_abort_the_batch() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("old.png"), [0u8]).expect("write");

        let first = format!("remove {}", root.join("old.png").display());
        let second = "shred --everything".to_string();
        let third = format!("mkdir {}", root.join("gallery").display());
        let outcomes = execute_commands(&root, &lines(&[&first, &second, &third]));

        assert_eq!(outcomes[0].disposition, CommandDisposition::Applied);
        assert!(matches!(
            outcomes[1].disposition,
            CommandDisposition::Rejected { .. }
        ));
        assert_eq!(outcomes[2].disposition, CommandDisposition::Applied);
        assert!(!root.join("old.png").exists());
        assert!(root.join("gallery").is_dir());
    }

    #[test]
    fn commands_against_a_missing_root_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("images");

        let line = format!("remove {}", root.join("a.png").display());
        let outcomes = execute_commands(&root, &lines(&[&line]));

        assert!(matches!(
            outcomes[0].disposition,
            CommandDisposition::Rejected { .. }
        ));
    }
}
