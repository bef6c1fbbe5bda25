//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::cli`.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::{CommandError, Facts};

// ── Value Types ───────────────────────────────────────────────────────────────

/// A structured external command: program, argument vector, extra
/// environment, and working directory. Never passed through a shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Added to (not replacing) the inherited environment.
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Build from an argv list; `None` when it is empty.
    #[must_use]
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Merged stdout/stderr text and exit status of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code; `None` when the child was killed by a signal.
    pub status: Option<i32>,
    pub output: String,
}

impl CommandResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Implementors provide `execute` and `run_status`; the two policies built on
/// top of `execute` are shared:
/// - `run` - a non-zero exit is fatal: the output is logged at error level and
///   the error is meant to unwind the whole run.
/// - `probe` - a non-zero exit is an expected, recoverable answer.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run `cmd` to completion with a closed stdin, capturing merged output.
    ///
    /// # Errors
    ///
    /// Returns an error only when the command could not be run or waited on
    /// (spawn failure, I/O error, timeout); a non-zero exit is `Ok`.
    async fn execute(&self, cmd: &CommandSpec) -> Result<CommandResult, CommandError>;

    /// Run `cmd` with inherited stdio and return its exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or waited on.
    async fn run_status(&self, cmd: &CommandSpec) -> Result<Option<i32>, CommandError>;

    /// Run `cmd`; any failure is fatal.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Failed` on a non-zero exit, after logging the
    /// full captured output, or whatever `execute` returned.
    async fn run(&self, cmd: &CommandSpec) -> Result<CommandResult> {
        let result = self.execute(cmd).await?;
        if result.success() {
            return Ok(result);
        }
        let err = CommandError::Failed {
            command: cmd.to_string(),
            status: result.status,
            output: result.output,
        };
        tracing::error!("{err}");
        tracing::error!("output:\n{}", err.output().unwrap_or_default());
        Err(err.into())
    }

    /// Run `cmd` where failure is informative rather than fatal.
    ///
    /// # Errors
    ///
    /// Returns the recoverable `CommandError` for a non-zero exit or a command
    /// that could not be run at all.
    async fn probe(&self, cmd: &CommandSpec) -> Result<CommandResult, CommandError> {
        let result = self.execute(cmd).await?;
        if result.success() {
            Ok(result)
        } else {
            Err(CommandError::Failed {
                command: cmd.to_string(),
                status: result.status,
                output: result.output,
            })
        }
    }
}

// ── Version Control Port ──────────────────────────────────────────────────────

/// Version-control operations needed to converge a source tree.
///
/// Implementations route every call through the authenticated transport.
#[allow(async_fn_in_trait)]
pub trait VersionControl {
    /// Full clone of `origin` into `dest`.
    async fn clone_repo(&self, origin: &str, dest: &Path) -> Result<()>;
    /// Single-branch, depth-limited clone of `origin` into `dest`.
    async fn shallow_clone(&self, origin: &str, branch: &str, depth: u32, dest: &Path)
    -> Result<()>;
    async fn fetch(&self, repo: &Path) -> Result<()>;
    async fn checkout(&self, repo: &Path, rev: &str) -> Result<()>;
    async fn pull(&self, repo: &Path) -> Result<()>;
    async fn submodule_sync(&self, repo: &Path) -> Result<()>;
    /// Initialise and update submodules recursively.
    async fn submodule_update(&self, repo: &Path) -> Result<()>;
}

// ── Configuration Tool Port ───────────────────────────────────────────────────

/// The external configuration-management tool.
#[allow(async_fn_in_trait)]
pub trait ConfigurationTool {
    /// Apply `manifest` (relative to `workdir`) with the given host facts.
    async fn apply(&self, workdir: &Path, manifest: &str, facts: &Facts) -> Result<()>;
}

// ── Host Ports ────────────────────────────────────────────────────────────────

/// Answers whether the process may perform privileged provisioning.
#[cfg_attr(test, mockall::automock)]
pub trait PrivilegeProbe {
    /// `true` when running with an effective uid of 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the effective uid cannot be determined.
    fn is_superuser(&self) -> Result<bool>;
}

/// What `LocalFs::inspect` found at a path, without following a final symlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Missing,
    Directory,
    File,
    /// A symlink; `dangling` when its target does not exist.
    Symlink { dangling: bool },
}

/// Abstracts the filesystem operations the services need.
pub trait LocalFs {
    fn inspect(&self, path: &Path) -> PathKind;
    /// Does `path` exist, following symlinks?
    fn exists(&self, path: &Path) -> bool;
    /// Create a symlink at `link` pointing to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be created.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;
    /// Remove a file or symlink.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be removed.
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Absolute path with every symlink resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
    /// Create a private scratch directory removed when the guard drops.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn scratch_dir(&self, prefix: &str) -> Result<tempfile::TempDir>;
}
