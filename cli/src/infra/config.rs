//! Loading Seedling settings from a YAML file on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::config::{SeedlingConfig, validate_config};

/// Settings file consulted when `--config` / `SEEDLING_CONFIG` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/seedling/config.yaml";

pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the settings. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// settings fail validation.
    pub fn load(&self) -> Result<SeedlingConfig> {
        let config = if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)
                .with_context(|| format!("cannot read {}", self.path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("cannot parse {}", self.path.display()))?
        } else {
            tracing::debug!("{} not found, using defaults", self.path.display());
            SeedlingConfig::default()
        };
        validate_config(&config).with_context(|| format!("invalid {}", self.path.display()))?;
        Ok(config)
    }
}

impl Default for YamlConfigStore {
    fn default() -> Self {
        Self::with_path(DEFAULT_CONFIG_PATH)
    }
}
