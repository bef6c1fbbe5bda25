//! Application service - the provisioning run.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::{Context, Result};
use tracing::info;

use crate::application::ports::{CommandRunner, ConfigurationTool, LocalFs, VersionControl};
use crate::application::services::repository::update_or_clone;
use crate::application::services::tooling::ensure_tool_installed;
use crate::domain::{InvocationConfig, SeedlingConfig};

/// The ports a provisioning run drives.
pub struct ProvisionPorts<'a, R, V, C, F> {
    pub runner: &'a R,
    pub vcs: &'a V,
    pub tool: &'a C,
    pub fs: &'a F,
}

/// Create the installation user and home with the bootstrap manifest.
///
/// The manifest lives in the source tree, which may not exist yet: a supplied
/// local tree is used directly, otherwise a shallow single-branch clone is
/// made into a scratch directory that is removed on every exit path.
///
/// # Errors
///
/// Returns an error if the clone or the configuration tool fails.
pub async fn create_user_and_home<R, V, C, F>(
    ports: &ProvisionPorts<'_, R, V, C, F>,
    config: &SeedlingConfig,
    invocation: &InvocationConfig,
) -> Result<()>
where
    R: CommandRunner,
    V: VersionControl,
    C: ConfigurationTool,
    F: LocalFs,
{
    let facts = invocation.facts();
    let manifest = &config.config_tool.bootstrap_manifest;

    if let Some(local) = &invocation.repo_path {
        info!("Creating user and home from {}", local.display());
        return ports.tool.apply(local, manifest, &facts).await;
    }

    let install = &config.install;
    let scratch = ports.fs.scratch_dir("seedling-bootstrap-")?;
    let checkout = scratch.path().join(&install.source_dir);
    info!("Fetching bootstrap manifests into {}", checkout.display());
    ports
        .vcs
        .shallow_clone(
            &install.origin,
            &install.bootstrap_branch,
            install.shallow_depth,
            &checkout,
        )
        .await?;
    ports.tool.apply(&checkout, manifest, &facts).await?;
    scratch.close().context("removing bootstrap checkout")?;
    Ok(())
}

/// Full local run: prerequisite tools, source tree, then site configuration.
///
/// # Errors
///
/// Returns the first fatal error; nothing after it runs.
pub async fn provision<R, V, C, F>(
    ports: &ProvisionPorts<'_, R, V, C, F>,
    config: &SeedlingConfig,
    invocation: &InvocationConfig,
) -> Result<()>
where
    R: CommandRunner,
    V: VersionControl,
    C: ConfigurationTool,
    F: LocalFs,
{
    for tool in &config.tools.0 {
        ensure_tool_installed(ports.runner, ports.fs, tool).await?;
    }

    update_or_clone(ports, config, invocation).await?;

    let source = config.install.source_path();
    info!("Applying site configuration");
    ports
        .tool
        .apply(&source, &config.config_tool.site_manifest, &invocation.facts())
        .await?;
    info!("Done");
    Ok(())
}
