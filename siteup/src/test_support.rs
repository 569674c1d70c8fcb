//! Test-only helpers: temp sites and scripted model clients.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::io::config::{ModelConfig, SiteConfig};
use crate::io::model::ModelClient;

/// Scripted client returning one canned response for every prompt.
pub struct ScriptedClient {
    response: String,
}

impl ScriptedClient {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl ModelClient for ScriptedClient {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// Client that always fails, for exercising fatal endpoint errors.
pub struct FailingClient;

impl ModelClient for FailingClient {
    fn complete(&self, _prompt: &str) -> Result<String> {
        anyhow::bail!("endpoint unreachable")
    }
}

/// A temp directory holding a site with pages and an `images/` root.
pub struct TempSite {
    dir: tempfile::TempDir,
}

impl TempSite {
    /// Create a site with the given pages and an empty images root.
    pub fn new(pages: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("images")).expect("create images root");
        for (name, content) in pages {
            fs::write(dir.path().join(name), content).expect("write page");
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn images_root(&self) -> PathBuf {
        self.dir.path().join("images")
    }

    /// Add an asset file under the images root.
    pub fn add_asset(&self, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = self.images_root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create asset dir");
        }
        fs::write(&path, bytes).expect("write asset");
        path
    }

    /// Config pointing at this site with the given managed pages.
    pub fn config(&self, pages: &[&str]) -> SiteConfig {
        SiteConfig {
            pages: pages.iter().map(|page| (*page).to_string()).collect(),
            site_root: self.dir.path().to_path_buf(),
            images_root: self.images_root(),
            reference: None,
            model: ModelConfig::default(),
        }
    }
}
