//! Local provisioning command.

use std::path::Path;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::{CommandRunner, LocalFs, PrivilegeProbe};
use crate::application::services::preflight::{check_privilege, resolve_local_tree};
use crate::application::services::provision::{ProvisionPorts, provision};
use crate::domain::{InvocationConfig, SeedlingConfig};
use crate::infra::config_tool::ConfigToolCli;
use crate::infra::git::GitCli;
use crate::infra::transport::TransportContext;

/// Provision this host.
///
/// # Errors
///
/// Returns a validation error before any side effect, or the first fatal
/// provisioning error.
pub async fn run(app: &AppContext, invocation: InvocationConfig) -> Result<()> {
    let exe = std::env::current_exe().context("locating the running executable")?;
    install(
        &app.runner,
        &app.fs,
        &app.privilege,
        &app.settings,
        invocation,
        &exe,
    )
    .await
}

/// Provision through the given ports; `exe` is the running executable.
///
/// The privilege gate runs first, so an unprivileged call runs no command
/// and touches nothing. The transport context lives for this call only;
/// its key directory is removed when it drops, whether provisioning
/// succeeded or not.
///
/// # Errors
///
/// Returns a validation error before any side effect, or the first fatal
/// provisioning error.
pub async fn install(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    privilege: &impl PrivilegeProbe,
    settings: &SeedlingConfig,
    mut invocation: InvocationConfig,
    exe: &Path,
) -> Result<()> {
    check_privilege(privilege)?;

    let exe = fs.canonicalize(exe)?;
    invocation.repo_path = resolve_local_tree(fs, &invocation, &exe, &settings.install.sentinel)?;

    let transport = TransportContext::from_config(&settings.transport)?;
    let git = GitCli::new(runner, &transport);
    let config_tool = ConfigToolCli::new(runner, &settings.config_tool);
    let ports = ProvisionPorts {
        runner,
        vcs: &git,
        tool: &config_tool,
        fs,
    };

    provision(&ports, settings, &invocation).await
}
