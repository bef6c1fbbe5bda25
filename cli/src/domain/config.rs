//! Domain types and validators for Seedling settings.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

#[allow(clippy::expect_used)] // literal pattern
static VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("version token pattern")
});

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level settings stored in `/etc/seedling/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SeedlingConfig {
    pub install: InstallConfig,
    pub config_tool: ConfigToolConfig,
    pub transport: TransportConfig,
    pub remote: RemoteConfig,
    /// Prerequisite tools, ensured in order.
    pub tools: ToolList,
    /// Kill any external command running longer than this. Unset means no limit.
    pub command_timeout_secs: Option<u64>,
}

/// Where the application is installed from and to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Installation user's home directory; its absence triggers bootstrap.
    pub home: PathBuf,
    /// Source tree directory name under `home`.
    pub source_dir: String,
    /// Version-control origin cloned over the authenticated transport.
    pub origin: String,
    /// File (relative to the tree root) that only the genuine source tree has.
    pub sentinel: PathBuf,
    /// Branch used for the throwaway bootstrap clone.
    pub bootstrap_branch: String,
    pub shallow_depth: u32,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from("/home/logzilla"),
            source_dir: "src".to_string(),
            origin: "git@git.assembla.com:lz5.git".to_string(),
            sentinel: PathBuf::from("vagrant/puppet/modules/logzilla/manifests/user.pp"),
            bootstrap_branch: "master".to_string(),
            shallow_depth: 1,
        }
    }
}

impl InstallConfig {
    /// Canonical location of the main source tree.
    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.home.join(&self.source_dir)
    }
}

/// How the configuration-management tool is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigToolConfig {
    pub program: String,
    /// Module path, relative to the source tree root.
    pub module_path: String,
    /// Manifest that creates the installation user and home.
    pub bootstrap_manifest: String,
    /// Manifest that installs and configures the whole site.
    pub site_manifest: String,
    /// Prefix turning a fact name into an environment variable name.
    pub fact_prefix: String,
}

impl Default for ConfigToolConfig {
    fn default() -> Self {
        Self {
            program: "puppet".to_string(),
            module_path: "vagrant/puppet/modules".to_string(),
            bootstrap_manifest: "vagrant/puppet/manifests/user_home.pp".to_string(),
            site_manifest: "vagrant/puppet/manifests/site.pp".to_string(),
            fact_prefix: "FACTER_".to_string(),
        }
    }
}

/// Authenticated version-control transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Transport client invoked by the wrapper script.
    pub client: String,
    /// Private key read at runtime instead of the embedded one.
    pub identity_file: Option<PathBuf>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            client: "ssh".to_string(),
            identity_file: None,
        }
    }
}

/// Programs used to relay an invocation to another host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub copy_program: String,
    pub shell_program: String,
    /// Privilege elevation command prefixed to the remote invocation.
    pub elevate: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            copy_program: "scp".to_string(),
            shell_program: "ssh".to_string(),
            elevate: "sudo".to_string(),
        }
    }
}

/// Ordered prerequisite tool list; defaults to puppet 3.x then git.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolList(pub Vec<ToolSpec>);

impl Default for ToolList {
    fn default() -> Self {
        let argv = |parts: &[&str]| parts.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
        Self(vec![
            ToolSpec {
                name: "puppet".to_string(),
                probe: argv(&["puppet", "-V"]),
                version_req: Some("^3".to_string()),
                install: vec![
                    argv(&["wget", "http://apt.puppetlabs.com/puppetlabs-release-trusty.deb"]),
                    argv(&["dpkg", "-i", "puppetlabs-release-trusty.deb"]),
                    argv(&["aptitude", "-q", "update"]),
                    argv(&["aptitude", "-q", "-y", "install", "puppet"]),
                ],
            },
            ToolSpec {
                name: "git".to_string(),
                probe: argv(&["git", "--version"]),
                version_req: None,
                install: vec![argv(&["aptitude", "-q", "-y", "install", "git"])],
            },
        ])
    }
}

/// A prerequisite tool: how to detect it and how to install it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    /// Command whose success (and output) proves the tool is present.
    pub probe: Vec<String>,
    /// Semver requirement the probed version must satisfy.
    #[serde(default)]
    pub version_req: Option<String>,
    /// Commands run in order when the probe fails.
    #[serde(default)]
    pub install: Vec<Vec<String>>,
}

impl ToolSpec {
    /// Does the probe's output satisfy this tool's version requirement?
    ///
    /// Without a requirement any output is accepted. With one, the first
    /// `major.minor[.patch]` token in the output must match it.
    ///
    /// # Errors
    ///
    /// Returns an error if the requirement itself does not parse.
    pub fn accepts(&self, probe_output: &str) -> Result<bool> {
        let Some(req) = &self.version_req else {
            return Ok(true);
        };
        let req = parse_version_req(&self.name, req)?;
        Ok(extract_version(probe_output).is_some_and(|v| req.matches(&v)))
    }
}

fn parse_version_req(tool: &str, req: &str) -> Result<VersionReq> {
    VersionReq::parse(req).map_err(|_| {
        ConfigError::InvalidVersionReq {
            tool: tool.to_string(),
            req: req.to_string(),
        }
        .into()
    })
}

/// First `major.minor[.patch]` token in `text`; a missing patch reads as 0.
#[must_use]
pub fn extract_version(text: &str) -> Option<Version> {
    let caps = VERSION_TOKEN.captures(text)?;
    let part = |i: usize| caps.get(i).map_or(Some(0), |m| m.as_str().parse::<u64>().ok());
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates the settings before anything runs.
///
/// # Errors
///
/// Returns an error on an empty probe or install command, or an unparsable
/// version requirement.
pub fn validate_config(config: &SeedlingConfig) -> Result<()> {
    for tool in &config.tools.0 {
        if tool.probe.is_empty() {
            return Err(ConfigError::EmptyProbe {
                tool: tool.name.clone(),
            }
            .into());
        }
        if let Some(step) = tool.install.iter().position(Vec::is_empty) {
            return Err(ConfigError::EmptyInstallStep {
                tool: tool.name.clone(),
                step: step + 1,
            }
            .into());
        }
        if let Some(req) = &tool.version_req {
            parse_version_req(&tool.name, req)?;
        }
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
