//! Application service - converging the canonical source tree.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::application::ports::{
    CommandRunner, ConfigurationTool, LocalFs, PathKind, VersionControl,
};
use crate::application::services::provision::{ProvisionPorts, create_user_and_home};
use crate::domain::{
    InvocationConfig, RepositoryState, SeedlingConfig, SourceAction, SyncStep, ValidationError,
    clone_steps, decide, sync_steps,
};

/// Version-control metadata directory of a checkout.
pub const VCS_DIR: &str = ".git";

/// Is `path` the genuine source tree: a checkout that also contains `sentinel`?
pub fn is_valid_repo(fs: &impl LocalFs, path: &Path, sentinel: &Path) -> bool {
    fs.exists(&path.join(VCS_DIR)) && fs.exists(&path.join(sentinel))
}

/// Observe what is at `source`.
///
/// A dangling symlink is removed and reported as `Absent`.
///
/// # Errors
///
/// Returns `ValidationError::SourceTreeNotCheckout` when `source` is a real
/// directory (or file) without version-control metadata, or an error if a
/// dangling symlink cannot be removed.
pub fn inspect_state(fs: &impl LocalFs, source: &Path) -> Result<RepositoryState> {
    match fs.inspect(source) {
        PathKind::Missing => Ok(RepositoryState::Absent),
        PathKind::Symlink { dangling: true } => {
            warn!("Removing dangling symlink {}", source.display());
            fs.remove_file(source)?;
            Ok(RepositoryState::Absent)
        }
        PathKind::Symlink { dangling: false } => Ok(RepositoryState::Symlinked),
        PathKind::Directory if fs.exists(&source.join(VCS_DIR)) => Ok(RepositoryState::Present),
        PathKind::Directory | PathKind::File => {
            Err(ValidationError::SourceTreeNotCheckout(source.to_path_buf()).into())
        }
    }
}

/// Bring the canonical source tree to the requested target.
///
/// Bootstraps the installation user and home first when the home directory
/// is missing. Returns the action taken.
///
/// # Errors
///
/// Returns an error if bootstrap, inspection, or any version-control step fails.
pub async fn update_or_clone<R, V, C, F>(
    ports: &ProvisionPorts<'_, R, V, C, F>,
    config: &SeedlingConfig,
    invocation: &InvocationConfig,
) -> Result<SourceAction>
where
    R: CommandRunner,
    V: VersionControl,
    C: ConfigurationTool,
    F: LocalFs,
{
    let install = &config.install;
    if !ports.fs.exists(&install.home) {
        info!("{} does not exist, creating user and home", install.home.display());
        create_user_and_home(ports, config, invocation).await?;
    }

    let source = install.source_path();
    let state = inspect_state(ports.fs, &source)?;
    let action = decide(state, invocation.repo_path.as_deref(), invocation.skip_update);
    info!("Source tree {} is {state:?}", source.display());

    match &action {
        SourceAction::Link(local) => {
            info!("Linking {} to {}", local.display(), source.display());
            ports.fs.symlink(local, &source)?;
        }
        SourceAction::Clone => {
            info!("Cloning {} into {}", install.origin, source.display());
            ports.vcs.clone_repo(&install.origin, &source).await?;
            apply_steps(ports.vcs, &source, &clone_steps(invocation.git_ref())).await?;
        }
        SourceAction::Sync => {
            info!("Updating {} to {}", source.display(), invocation.target);
            apply_steps(ports.vcs, &source, &sync_steps(invocation.git_ref())).await?;
        }
        SourceAction::Keep => info!("Updates disabled, leaving {} as is", source.display()),
    }
    Ok(action)
}

async fn apply_steps(vcs: &impl VersionControl, repo: &Path, steps: &[SyncStep]) -> Result<()> {
    for step in steps {
        match step {
            SyncStep::Fetch => vcs.fetch(repo).await?,
            SyncStep::Checkout(rev) => vcs.checkout(repo, rev).await?,
            SyncStep::Pull => vcs.pull(repo).await?,
            SyncStep::SubmoduleSync => vcs.submodule_sync(repo).await?,
            SyncStep::SubmoduleUpdate => vcs.submodule_update(repo).await?,
        }
    }
    Ok(())
}
