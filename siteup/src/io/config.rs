//! Tool configuration stored in `siteup.toml`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Site updater configuration (TOML).
///
/// This file is intended to be edited by humans. Missing fields default to
/// the layout of a small static site with an `images/` directory next to the
/// pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    /// Managed page files, relative to `site_root`. Only these may ever be
    /// rewritten from a model response.
    pub pages: Vec<String>,

    /// Directory the page paths are relative to.
    pub site_root: PathBuf,

    /// The single directory tree that model-requested commands may modify.
    pub images_root: PathBuf,

    /// Optional reference text file included in every prompt (site facts,
    /// tone, contact details).
    pub reference: Option<PathBuf>,

    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier sent with each request.
    pub model: String,

    /// OpenAI-compatible endpoint base, without the `/chat/completions`
    /// suffix.
    pub base_url: String,

    /// Client-level timeout for the completion request.
    pub timeout_secs: u64,

    /// Upper bound for generated tokens; `None` leaves it to the endpoint.
    pub max_output_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 120,
            max_output_tokens: None,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            pages: [
                "index.html",
                "about.html",
                "groups.html",
                "contact.html",
                "donation.html",
                "faq.html",
            ]
            .iter()
            .map(|page| (*page).to_string())
            .collect(),
            site_root: PathBuf::from("."),
            images_root: PathBuf::from("images"),
            reference: None,
            model: ModelConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(anyhow!("pages must name at least one file"));
        }
        let mut seen = BTreeSet::new();
        for page in &self.pages {
            if page.trim().is_empty() {
                return Err(anyhow!("pages must not contain blank entries"));
            }
            if !seen.insert(page) {
                return Err(anyhow!("duplicate page entry '{page}'"));
            }
        }
        if self.model.model.trim().is_empty() {
            return Err(anyhow!("model.model must not be blank"));
        }
        if self.model.timeout_secs == 0 {
            return Err(anyhow!("model.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SiteConfig::default()`.
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    if !path.exists() {
        let cfg = SiteConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SiteConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
