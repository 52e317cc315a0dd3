use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use models::ConfigDocument;
use tempfile::NamedTempFile;

/// Reads and writes the single JSON document holding settings and the credits cache.
///
/// `load`/`save` never fail outward: problems are logged and degrade to an
/// empty document or `false`. `try_load`/`try_save` expose the reason.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty document, not an error.
    pub fn try_load(&self) -> eyre::Result<ConfigDocument> {
        if !self.path.exists() {
            return Ok(ConfigDocument::default());
        }
        let raw = std::fs::read_to_string(&self.path).wrap_err("read config file")?;
        serde_json::from_str(&raw).wrap_err("parse config json")
    }

    pub fn load(&self) -> ConfigDocument {
        match self.try_load() {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(
                    "failed to load config {} (using empty config): {e:#}",
                    self.path.display()
                );
                ConfigDocument::default()
            }
        }
    }

    /// Replace the file atomically (temp file in the same directory, then rename).
    pub fn try_save(&self, doc: &ConfigDocument) -> eyre::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).wrap_err("create config directory")?;

        let json = serde_json::to_string_pretty(doc).wrap_err("serialize config")?;
        let mut tmp = NamedTempFile::new_in(&dir).wrap_err("create temp config file")?;
        tmp.write_all(json.as_bytes()).wrap_err("write temp config file")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .wrap_err("replace config file")?;
        Ok(())
    }

    pub fn save(&self, doc: &ConfigDocument) -> bool {
        match self.try_save(doc) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("failed to save config {}: {e:#}", self.path.display());
                false
            }
        }
    }
}
