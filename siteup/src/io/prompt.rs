//! Prompt construction for the update request.
//!
//! Pure assembly: file contents, the user instruction, optional site
//! reference text, and the asset listing are rendered through a bundled
//! template. The network call happens elsewhere.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;
use tracing::debug;

const UPDATE_TEMPLATE: &str = include_str!("prompts/update.md");

/// One page entry for template rendering.
#[derive(Debug, Clone, Serialize)]
struct FileContext {
    path: String,
    content: String,
}

/// All inputs needed to build the update prompt.
#[derive(Debug, Clone)]
pub struct PromptInputs<'a> {
    /// The user's change instruction, any text accepted.
    pub instruction: &'a str,
    /// Managed pages, path -> current content.
    pub pages: &'a BTreeMap<String, String>,
    /// Optional site reference text.
    pub reference: Option<&'a str>,
    /// Discovered asset paths relative to the images root.
    pub assets: &'a [String],
}

/// Render the update prompt.
pub fn build_prompt(inputs: &PromptInputs<'_>) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("update", UPDATE_TEMPLATE)
        .expect("update template should be valid");

    let files: Vec<FileContext> = inputs
        .pages
        .iter()
        .map(|(path, content)| FileContext {
            path: path.clone(),
            content: content.clone(),
        })
        .collect();

    let file_count = files.len();
    let template = env.get_template("update").context("load update template")?;
    let rendered = template
        .render(context! {
            instruction => inputs.instruction.trim(),
            reference => inputs.reference.map(str::trim).filter(|s| !s.is_empty()),
            assets => (!inputs.assets.is_empty()).then_some(inputs.assets),
            files => files,
        })
        .context("render update template")?;

    debug!(bytes = rendered.len(), files = file_count, "rendered prompt");
    Ok(rendered)
}
