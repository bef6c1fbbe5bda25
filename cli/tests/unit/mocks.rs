//! Shared mock infrastructure for unit tests.
//!
//! The mocks touch the real filesystem where the production adapters would,
//! so services can be driven against a `TempDir` through `HostFs`.

#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use seedling_cli::application::ports::{
    CommandResult, CommandRunner, CommandSpec, ConfigurationTool, VersionControl,
};
use seedling_cli::domain::config::SeedlingConfig;
use seedling_cli::domain::{CommandError, Facts};

pub const SENTINEL: &str = "vagrant/puppet/modules/logzilla/manifests/user.pp";
pub const COMMIT: &str = "a1b2c3d4e5f6a7b8c9d0a1b2c3d4e5f6a7b8c9d0";

// ── Output helpers ────────────────────────────────────────────────────────────

pub fn ok(output: &str) -> CommandResult {
    CommandResult {
        status: Some(0),
        output: output.to_string(),
    }
}

pub fn failed(status: i32, output: &str) -> CommandResult {
    CommandResult {
        status: Some(status),
        output: output.to_string(),
    }
}

// ── MockCommandRunner ─────────────────────────────────────────────────────────

type Handler = Arc<dyn Fn(&CommandSpec) -> CommandResult + Send + Sync>;

/// Records every command and answers with a configurable handler.
#[derive(Clone)]
pub struct MockCommandRunner {
    calls: Arc<Mutex<Vec<CommandSpec>>>,
    handler: Handler,
    remote_status: Option<i32>,
}

impl MockCommandRunner {
    /// Every command succeeds with empty output.
    pub fn new_ok() -> Self {
        Self::with_handler(|_| ok(""))
    }

    pub fn with_handler(handler: impl Fn(&CommandSpec) -> CommandResult + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            handler: Arc::new(handler),
            remote_status: Some(0),
        }
    }

    /// Exit status reported by `run_status`.
    pub fn with_remote_status(mut self, status: Option<i32>) -> Self {
        self.remote_status = status;
        self
    }

    pub fn recorded_calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().expect("mutex poisoned").clone()
    }

    /// Recorded calls rendered as command lines.
    pub fn lines(&self) -> Vec<String> {
        self.recorded_calls().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for MockCommandRunner {
    async fn execute(&self, cmd: &CommandSpec) -> Result<CommandResult, CommandError> {
        self.calls.lock().expect("mutex poisoned").push(cmd.clone());
        Ok((self.handler)(cmd))
    }

    async fn run_status(&self, cmd: &CommandSpec) -> Result<Option<i32>, CommandError> {
        self.calls.lock().expect("mutex poisoned").push(cmd.clone());
        Ok(self.remote_status)
    }
}

// ── MockVcs ───────────────────────────────────────────────────────────────────

/// Records version-control operations; clones create a checkout on disk.
#[derive(Default)]
pub struct MockVcs {
    ops: Mutex<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl MockVcs {
    /// Fail the first operation whose name is `op`.
    pub fn failing_on(op: &'static str) -> Self {
        Self {
            ops: Mutex::new(Vec::new()),
            fail_on: Some(op),
        }
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().expect("mutex poisoned").clone()
    }

    /// Operations that talk to the origin.
    pub fn network_ops(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter(|op| {
                let name = op.split_whitespace().next().unwrap_or_default();
                matches!(name, "clone" | "shallow_clone" | "fetch" | "pull")
            })
            .collect()
    }

    fn record(&self, name: &str, detail: String) -> Result<()> {
        let line = if detail.is_empty() {
            name.to_string()
        } else {
            format!("{name} {detail}")
        };
        self.ops.lock().expect("mutex poisoned").push(line);
        if self.fail_on == Some(name) {
            bail!("{name} failed");
        }
        Ok(())
    }
}

impl VersionControl for MockVcs {
    async fn clone_repo(&self, origin: &str, dest: &Path) -> Result<()> {
        self.record("clone", format!("{origin} {}", dest.display()))?;
        make_checkout(dest);
        Ok(())
    }

    async fn shallow_clone(&self, origin: &str, branch: &str, depth: u32, dest: &Path) -> Result<()> {
        self.record("shallow_clone", format!("{origin} {branch} {depth}"))?;
        make_checkout(dest);
        Ok(())
    }

    async fn fetch(&self, _repo: &Path) -> Result<()> {
        self.record("fetch", String::new())
    }

    async fn checkout(&self, _repo: &Path, rev: &str) -> Result<()> {
        self.record("checkout", rev.to_string())
    }

    async fn pull(&self, _repo: &Path) -> Result<()> {
        self.record("pull", String::new())
    }

    async fn submodule_sync(&self, _repo: &Path) -> Result<()> {
        self.record("submodule_sync", String::new())
    }

    async fn submodule_update(&self, _repo: &Path) -> Result<()> {
        self.record("submodule_update", String::new())
    }
}

// ── MockConfigTool ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Applied {
    pub workdir: PathBuf,
    pub manifest: String,
    pub facts: Facts,
    /// Whether `workdir` existed while the tool ran.
    pub workdir_existed: bool,
}

/// Records applies; the bootstrap manifest creates the installation home,
/// as the real one does.
pub struct MockConfigTool {
    applies: Mutex<Vec<Applied>>,
    home: PathBuf,
    fail: bool,
}

impl MockConfigTool {
    pub fn new(home: &Path) -> Self {
        Self {
            applies: Mutex::new(Vec::new()),
            home: home.to_path_buf(),
            fail: false,
        }
    }

    pub fn failing(home: &Path) -> Self {
        Self {
            fail: true,
            ..Self::new(home)
        }
    }

    pub fn applies(&self) -> Vec<Applied> {
        self.applies.lock().expect("mutex poisoned").clone()
    }
}

impl ConfigurationTool for MockConfigTool {
    async fn apply(&self, workdir: &Path, manifest: &str, facts: &Facts) -> Result<()> {
        self.applies.lock().expect("mutex poisoned").push(Applied {
            workdir: workdir.to_path_buf(),
            manifest: manifest.to_string(),
            facts: facts.clone(),
            workdir_existed: workdir.is_dir(),
        });
        if self.fail {
            bail!("puppet apply failed");
        }
        if manifest.ends_with("user_home.pp") {
            std::fs::create_dir_all(&self.home).expect("create home");
        }
        Ok(())
    }
}

// ── Filesystem fixtures ───────────────────────────────────────────────────────

/// A directory that looks like a checkout without the sentinel.
pub fn make_checkout(path: &Path) {
    std::fs::create_dir_all(path.join(".git")).expect("create .git");
}

/// A directory that passes the genuine-source-tree check.
pub fn make_source_tree(path: &Path) {
    make_checkout(path);
    let sentinel = path.join(SENTINEL);
    std::fs::create_dir_all(sentinel.parent().expect("parent")).expect("create sentinel dir");
    std::fs::write(&sentinel, "class logzilla::user {}\n").expect("write sentinel");
}

/// Settings rooted at `root`: home `root/home`, no prerequisite tools.
pub fn settings(root: &Path) -> SeedlingConfig {
    let mut settings = SeedlingConfig::default();
    settings.install.home = root.join("home");
    settings.tools.0.clear();
    settings
}
