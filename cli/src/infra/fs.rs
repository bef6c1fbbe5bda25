//! Filesystem infrastructure - implements `LocalFs` on the host filesystem.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, PathKind};

/// Production `LocalFs`.
pub struct HostFs;

impl LocalFs for HostFs {
    fn inspect(&self, path: &Path) -> PathKind {
        let Ok(meta) = std::fs::symlink_metadata(path) else {
            return PathKind::Missing;
        };
        let kind = meta.file_type();
        if kind.is_symlink() {
            PathKind::Symlink {
                dangling: !path.exists(),
            }
        } else if kind.is_dir() {
            PathKind::Directory
        } else {
            PathKind::File
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link).with_context(|| {
                format!("linking {} -> {}", link.display(), target.display())
            })
        }
        #[cfg(not(unix))]
        {
            anyhow::bail!(
                "symlinks are not supported here: {} -> {}",
                link.display(),
                target.display()
            )
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("removing {}", path.display()))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        std::fs::canonicalize(path).with_context(|| format!("resolving {}", path.display()))
    }

    fn scratch_dir(&self, prefix: &str) -> Result<tempfile::TempDir> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .context("creating scratch directory")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o700))
                .with_context(|| format!("cannot set permissions on {}", dir.path().display()))?;
        }
        Ok(dir)
    }
}
