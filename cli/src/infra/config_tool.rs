//! `ConfigurationTool` over the puppet-style `apply` command line.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, CommandSpec, ConfigurationTool};
use crate::domain::Facts;
use crate::domain::config::ConfigToolConfig;

pub struct ConfigToolCli<'a, R> {
    runner: &'a R,
    config: &'a ConfigToolConfig,
}

impl<'a, R: CommandRunner> ConfigToolCli<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R, config: &'a ConfigToolConfig) -> Self {
        Self { runner, config }
    }
}

impl<R: CommandRunner> ConfigurationTool for ConfigToolCli<'_, R> {
    async fn apply(&self, workdir: &Path, manifest: &str, facts: &Facts) -> Result<()> {
        let mut cmd = CommandSpec::new(&self.config.program)
            .arg("apply")
            .arg(format!("--modulepath={}", self.config.module_path))
            .arg("--verbose")
            .arg(manifest)
            .cwd(workdir);
        for (key, value) in facts.to_env(&self.config.fact_prefix) {
            cmd = cmd.env(key, value);
        }
        self.runner.run(&cmd).await?;
        Ok(())
    }
}
