//! `VersionControl` over the `git` command line.
//!
//! When a deploy key is available every invocation carries the transport
//! wrapper in its environment, so remote operations authenticate with it.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, CommandSpec, VersionControl};
use crate::infra::transport::{TRANSPORT_ENV, TransportContext};

const GIT: &str = "git";

/// `git` driven through a `CommandRunner`, authenticated by a lazily created transport.
pub struct GitCli<'a, R> {
    runner: &'a R,
    transport: &'a TransportContext,
}

impl<'a, R: CommandRunner> GitCli<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R, transport: &'a TransportContext) -> Self {
        Self { runner, transport }
    }

    async fn git(&self, cwd: Option<&Path>, args: &[&str]) -> Result<()> {
        let mut cmd = CommandSpec::new(GIT).args(args.iter().copied());
        if let Some(wrapper) = self.transport.ensure().await? {
            cmd = cmd.env(TRANSPORT_ENV, wrapper.to_string_lossy());
        }
        if let Some(dir) = cwd {
            cmd = cmd.cwd(dir);
        }
        self.runner.run(&cmd).await?;
        Ok(())
    }
}

impl<R: CommandRunner> VersionControl for GitCli<'_, R> {
    async fn clone_repo(&self, origin: &str, dest: &Path) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.git(None, &["clone", origin, &dest]).await
    }

    async fn shallow_clone(
        &self,
        origin: &str,
        branch: &str,
        depth: u32,
        dest: &Path,
    ) -> Result<()> {
        let depth = depth.to_string();
        let dest = dest.to_string_lossy();
        self.git(
            None,
            &["clone", "--depth", &depth, "--single-branch", "-b", branch, origin, &dest],
        )
        .await
    }

    async fn fetch(&self, repo: &Path) -> Result<()> {
        self.git(Some(repo), &["fetch"]).await
    }

    async fn checkout(&self, repo: &Path, rev: &str) -> Result<()> {
        self.git(Some(repo), &["checkout", rev]).await
    }

    async fn pull(&self, repo: &Path) -> Result<()> {
        self.git(Some(repo), &["pull"]).await
    }

    async fn submodule_sync(&self, repo: &Path) -> Result<()> {
        self.git(Some(repo), &["submodule", "sync", "--recursive"]).await
    }

    async fn submodule_update(&self, repo: &Path) -> Result<()> {
        self.git(Some(repo), &["submodule", "update", "--init", "--recursive"])
            .await
    }
}
