//! Application service - checks that run before any provisioning side effect.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::ports::{LocalFs, PrivilegeProbe};
use crate::application::services::repository::is_valid_repo;
use crate::domain::{InvocationConfig, ValidationError};

/// Fail unless the process runs as the superuser.
///
/// # Errors
///
/// Returns `ValidationError::NotSuperuser`, or the probe's own error.
pub fn check_privilege(probe: &impl PrivilegeProbe) -> Result<()> {
    if probe.is_superuser()? {
        Ok(())
    } else {
        Err(ValidationError::NotSuperuser.into())
    }
}

/// Nearest ancestor of `start` (inclusive) that is the genuine source tree.
pub fn find_enclosing_repo(fs: &impl LocalFs, start: &Path, sentinel: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| is_valid_repo(fs, dir, sentinel))
        .map(Path::to_path_buf)
}

/// Resolve the pre-existing tree to use instead of cloning, if any.
///
/// With `skip_clone` it is the tree enclosing `executable`. Otherwise a
/// supplied repo path is validated and made absolute.
///
/// # Errors
///
/// Returns `NoEnclosingRepo` or `InvalidRepoPath` when the tree cannot be trusted.
pub fn resolve_local_tree(
    fs: &impl LocalFs,
    invocation: &InvocationConfig,
    executable: &Path,
    sentinel: &Path,
) -> Result<Option<PathBuf>> {
    if invocation.skip_clone {
        let start = executable.parent().unwrap_or(executable);
        return match find_enclosing_repo(fs, start, sentinel) {
            Some(tree) => Ok(Some(tree)),
            None => Err(ValidationError::NoEnclosingRepo(start.to_path_buf()).into()),
        };
    }

    match &invocation.repo_path {
        None => Ok(None),
        Some(path) if is_valid_repo(fs, path, sentinel) => Ok(Some(fs.canonicalize(path)?)),
        Some(path) => Err(ValidationError::InvalidRepoPath(path.clone()).into()),
    }
}
