//! Application context - unified state passed to every command handler.
//!
//! `AppContext` is constructed once in `Cli::run()` and bundles the loaded
//! settings with the production adapters, so command handlers take a single
//! `&AppContext` instead of loose parameters.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::domain::SeedlingConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::fs::HostFs;
use crate::infra::privilege::ProcPrivilege;

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Settings loaded from the YAML file, or the defaults.
    pub settings: SeedlingConfig,
    /// Runs every external command.
    pub runner: TokioCommandRunner,
    pub fs: HostFs,
    pub privilege: ProcPrivilege,
}

impl AppContext {
    /// Load settings from `config_path` and build the production adapters.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be read,
    /// parsed or validated.
    pub fn new(config_path: &Path) -> Result<Self> {
        let settings = YamlConfigStore::with_path(config_path).load()?;
        Ok(Self::with_settings(settings))
    }

    #[must_use]
    pub fn with_settings(settings: SeedlingConfig) -> Self {
        let timeout = settings.command_timeout_secs.map(Duration::from_secs);
        Self {
            settings,
            runner: TokioCommandRunner::new(timeout),
            fs: HostFs,
            privilege: ProcPrivilege,
        }
    }
}
