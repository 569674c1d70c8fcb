//! Managed page files: loading and conditional rewrite.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::core::response::Block;
use crate::core::types::{FileDisposition, FileOutcome};

/// Load every managed page into a path -> content map.
///
/// A missing page is fatal: the tool refuses to run against a partial site.
pub fn load_pages(site_root: &Path, pages: &[String]) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for page in pages {
        let path = site_root.join(page);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("read page {}", path.display()))?;
        map.insert(page.clone(), content);
    }
    debug!(pages = map.len(), "loaded managed pages");
    Ok(map)
}

/// Apply parsed response blocks to the managed pages.
///
/// Write policy: a block is written only when its label names a managed page
/// and its body differs from the original content. Unknown labels and
/// unchanged bodies are recorded and skipped, and a failed write is recorded
/// without aborting the remaining blocks. No file outside `pages` is ever
/// created.
pub fn apply_blocks(
    site_root: &Path,
    pages: &BTreeMap<String, String>,
    blocks: &[Block],
) -> Vec<FileOutcome> {
    let mut outcomes = Vec::with_capacity(blocks.len());
    for block in blocks {
        let disposition = match pages.get(&block.label) {
            None => {
                warn!(label = %block.label, "skipping unknown label in response");
                FileDisposition::UnknownLabel
            }
            Some(original) if *original == block.body => {
                debug!(page = %block.label, "content unchanged, skipping write");
                FileDisposition::Unchanged
            }
            Some(_) => {
                let path = site_root.join(&block.label);
                match fs::write(&path, &block.body) {
                    Ok(()) => {
                        info!(page = %block.label, bytes = block.body.len(), "updated page");
                        FileDisposition::Written
                    }
                    Err(err) => {
                        warn!(page = %block.label, err = %err, "failed to write page");
                        FileDisposition::Failed {
                            error: err.to_string(),
                        }
                    }
                }
            }
        };
        outcomes.push(FileOutcome {
            label: block.label.clone(),
            disposition,
        });
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(label: &str, body: &str) -> Block {
        Block {
            label: label.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn load_pages_errors_on_missing_page() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("index.html"), "<html></html>").expect("write page");

        let err = load_pages(
            temp.path(),
            &["index.html".to_string(), "about.html".to_string()],
        )
        .unwrap_err();

        assert!(err.to_string().contains("about.html"));
    }

    /// Verifies the round-trip property: a written body reads back exactly.
    #[test]
    fn written_block_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("index.html"), "old").expect("write page");
        let pages = load_pages(temp.path(), &["index.html".to_string()]).expect("load");

        let outcomes = apply_blocks(temp.path(), &pages, &[block("index.html", "<p>new</p>")]);

        assert_eq!(outcomes[0].disposition, FileDisposition::Written);
        let on_disk = fs::read_to_string(temp.path().join("index.html")).expect("read back");
        assert_eq!(on_disk, "<p>new</p>");
    }

    /// Verifies idempotence: a body equal to the current content writes nothing.
    #[test]
    fn unchanged_body_is_skipped() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("index.html"), "same").expect("write page");
        let pages = load_pages(temp.path(), &["index.html".to_string()]).expect("load");
        let modified_before = fs::metadata(temp.path().join("index.html"))
            .expect("metadata")
            .modified()
            .expect("mtime");

        let outcomes = apply_blocks(temp.path(), &pages, &[block("index.html", "same")]);

        assert_eq!(outcomes[0].disposition, FileDisposition::Unchanged);
        let modified_after = fs::metadata(temp.path().join("index.html"))
            .expect("metadata")
            .modified()
            .expect("mtime");
        assert_eq!(modified_before, modified_after);
    }

    /// Verifies unknown-label safety: no file is created for an unknown label.
    #[test]
    fn unknown_label_never_creates_a_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("index.html"), "content").expect("write page");
        let pages = load_pages(temp.path(), &["index.html".to_string()]).expect("load");

        let outcomes = apply_blocks(
            temp.path(),
            &pages,
            &[block("evil.html", "<script>boom</script>")],
        );

        assert_eq!(outcomes[0].disposition, FileDisposition::UnknownLabel);
        assert!(!temp.path().join("evil.html").exists());
    }

    #[test]
    fn failed_write_does_not_abort_the_batch() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("a.html"), "a").expect("write page");
        fs::write(temp.path().join("b.html"), "b").expect("write page");
        let pages = load_pages(temp.path(), &["a.html".to_string(), "b.html".to_string()])
            .expect("load");
        // Turn a.html into a directory so the write fails.
        fs::remove_file(temp.path().join("a.html")).expect("remove");
        fs::create_dir(temp.path().join("a.html")).expect("mkdir");

        let outcomes = apply_blocks(
            temp.path(),
            &pages,
            &[block("a.html", "new a"), block("b.html", "new b")],
        );

        assert!(matches!(
            outcomes[0].disposition,
            FileDisposition::Failed { .. }
        ));
        assert_eq!(outcomes[1].disposition, FileDisposition::Written);
        let b = fs::read_to_string(temp.path().join("b.html")).expect("read b");
        assert_eq!(b, "new b");
    }
}
