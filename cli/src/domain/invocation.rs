//! Invocation domain types: the parsed request, target ref, and facts.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

/// Ref checked out when `--branch` is not given.
pub const DEFAULT_REF: &str = "master";

/// Hostname fact used when `--fqdn` is not given.
pub const DEFAULT_FQDN: &str = "localhost";

#[allow(clippy::expect_used)] // literal pattern
static COMMIT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{40}$").expect("commit id pattern"));

/// Log verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    #[default]
    Normal,
    /// Every command output line.
    Debug,
}

/// Immutable record of one invocation, parsed once and read by every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    /// Branch name or commit id to bring the source tree to.
    pub target: String,
    pub verbosity: Verbosity,
    /// Host (optionally `user@host`) to relay the whole invocation to.
    pub remote: Option<String>,
    /// Pre-existing source tree to use instead of cloning.
    pub repo_path: Option<PathBuf>,
    /// Reuse the source tree the running program lives in.
    pub skip_clone: bool,
    /// Leave an existing tree untouched.
    pub skip_update: bool,
    /// Install packages and base configuration, not the application.
    pub preset_only: bool,
    pub fqdn: String,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_REF.to_string(),
            verbosity: Verbosity::Normal,
            remote: None,
            repo_path: None,
            skip_clone: false,
            skip_update: false,
            preset_only: false,
            fqdn: DEFAULT_FQDN.to_string(),
        }
    }
}

impl InvocationConfig {
    /// Facts handed to the configuration tool for this invocation.
    #[must_use]
    pub fn facts(&self) -> Facts {
        Facts {
            fqdn: self.fqdn.clone(),
            install_application: !self.preset_only,
        }
    }

    /// The requested target, classified.
    #[must_use]
    pub fn git_ref(&self) -> GitRef<'_> {
        GitRef::classify(&self.target)
    }
}

/// A checkout target: either a full commit id or a branch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitRef<'a> {
    /// 40 lowercase hex characters; checked out detached, never pulled.
    Commit(&'a str),
    Branch(&'a str),
}

impl<'a> GitRef<'a> {
    /// Classify `target`: exactly 40 lowercase hex characters is a commit id,
    /// anything else is a branch.
    #[must_use]
    pub fn classify(target: &'a str) -> Self {
        if COMMIT_ID.is_match(target) {
            Self::Commit(target)
        } else {
            Self::Branch(target)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Commit(s) | Self::Branch(s) => s,
        }
    }
}

/// Host facts passed to the configuration tool through the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facts {
    pub fqdn: String,
    pub install_application: bool,
}

impl Facts {
    /// Environment variables carrying these facts, each name prefixed with `prefix`.
    #[must_use]
    pub fn to_env(&self, prefix: &str) -> Vec<(String, String)> {
        vec![
            (format!("{prefix}fqdn"), self.fqdn.clone()),
            (
                format!("{prefix}install_application"),
                self.install_application.to_string(),
            ),
        ]
    }
}
