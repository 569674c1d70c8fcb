//! Orchestration for a single update run.

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::response::parse_response;
use crate::core::types::UpdateReport;
use crate::io::config::SiteConfig;
use crate::io::images::{execute_commands, list_assets};
use crate::io::model::ModelClient;
use crate::io::prompt::{PromptInputs, build_prompt};
use crate::io::site::{apply_blocks, load_pages};

/// Run one update: load pages, ask the model, apply the response.
///
/// File writes and command execution are best-effort per item and recorded in
/// the returned report; only endpoint, config, and page-loading failures
/// abort the run. Nothing is retried and partially applied changes are not
/// rolled back.
#[instrument(skip_all, fields(pages = config.pages.len()))]
pub fn run_update<C: ModelClient>(
    config: &SiteConfig,
    client: &C,
    instruction: &str,
) -> Result<UpdateReport> {
    let pages = load_pages(&config.site_root, &config.pages)?;
    let assets = list_assets(&config.images_root)?;
    let reference = read_reference(config)?;

    let prompt = build_prompt(&PromptInputs {
        instruction,
        pages: &pages,
        reference: reference.as_deref(),
        assets: &assets,
    })?;
    debug!(
        prompt_bytes = prompt.len(),
        assets = assets.len(),
        "built prompt"
    );

    let raw = client.complete(&prompt).context("complete update request")?;
    let parsed = parse_response(&raw);
    info!(
        blocks = parsed.blocks.len(),
        commands = parsed.command_lines.len(),
        no_changes = parsed.no_changes,
        "parsed model response"
    );

    let files = if parsed.no_changes {
        Vec::new()
    } else {
        apply_blocks(&config.site_root, &pages, &parsed.blocks)
    };
    let commands = execute_commands(&config.images_root, &parsed.command_lines);

    Ok(UpdateReport {
        no_changes: parsed.no_changes,
        files,
        commands,
    })
}

fn read_reference(config: &SiteConfig) -> Result<Option<String>> {
    let Some(path) = &config.reference else {
        return Ok(None);
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read reference {}", path.display()))?;
    Ok(Some(contents))
}
