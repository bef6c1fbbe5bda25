//! Authenticated version-control transport.
//!
//! `TransportWrapper` materialises the deploy key and a wrapper script that
//! runs the transport client with it, inside one private temporary directory.
//! The directory (and the key material with it) is removed when the wrapper
//! is dropped, on every exit path of the owning scope.
//!
//! `TransportContext` creates the wrapper lazily, at most once, the first
//! time a version-control command needs it.

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::ConfigError;
use crate::domain::config::TransportConfig;
use crate::domain::remote::shell_quote;
use crate::infra::assets;

/// Environment variable git consults for the transport client to use.
pub const TRANSPORT_ENV: &str = "GIT_SSH";

const KEY_FILE: &str = "id_deploy";
const SCRIPT_FILE: &str = "ssh_wrapper";

/// Private key plus wrapper script inside an owner-only temporary directory.
#[derive(Debug)]
pub struct TransportWrapper {
    dir: tempfile::TempDir,
    key_path: PathBuf,
    script_path: PathBuf,
}

impl TransportWrapper {
    /// Materialise `key` and a wrapper around `client` in a fresh temp dir.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or any file cannot be written.
    pub fn create(key: &[u8], client: &str) -> Result<Self> {
        Self::create_in(&std::env::temp_dir(), key, client)
    }

    /// Like [`TransportWrapper::create`], under `parent` instead of the
    /// system temp dir.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or any file cannot be written.
    pub fn create_in(parent: &Path, key: &[u8], client: &str) -> Result<Self> {
        if key.iter().all(u8::is_ascii_whitespace) {
            return Err(ConfigError::MissingDeployKey.into());
        }

        let dir = tempfile::Builder::new()
            .prefix("seedling-transport-")
            .tempdir_in(parent)
            .context("creating transport directory")?;
        set_permissions(dir.path(), 0o700)?;

        info!("Adding installer key");
        let key_path = dir.path().join(KEY_FILE);
        let mut contents = key.to_vec();
        if !contents.ends_with(b"\n") {
            contents.push(b'\n');
        }
        write_private(&key_path, &contents, 0o600)?;
        info!("Key saved in {}", key_path.display());

        let script_path = dir.path().join(SCRIPT_FILE);
        let script = wrapper_script(client, &key_path);
        write_private(&script_path, script.as_bytes(), 0o700)?;
        debug!("Transport wrapper at {}", script_path.display());

        Ok(Self {
            dir,
            key_path,
            script_path,
        })
    }

    #[must_use]
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    #[must_use]
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Shell script forwarding its arguments to `client` with the deploy key,
/// host-key checking off and no known-hosts file.
fn wrapper_script(client: &str, key_path: &Path) -> String {
    format!(
        "#!/bin/sh\nexec {} -i {} -o IdentitiesOnly=yes -o UserKnownHostsFile=/dev/null -o StrictHostKeyChecking=no \"$@\"\n",
        shell_quote(client),
        shell_quote(&key_path.to_string_lossy()),
    )
}

/// Lazily created, process-wide transport shared by every version-control call.
pub struct TransportContext {
    key: Cow<'static, [u8]>,
    client: String,
    wrapper: OnceCell<TransportWrapper>,
}

impl TransportContext {
    /// Use the configured identity file, or the key embedded at build time.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured identity file cannot be read.
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        let key = match &config.identity_file {
            Some(path) => Cow::Owned(std::fs::read(path).map_err(|source| {
                ConfigError::UnreadableIdentity {
                    path: path.clone(),
                    source,
                }
            })?),
            None => Cow::Borrowed(assets::deploy_key()),
        };
        Ok(Self::with_key(key, &config.client))
    }

    /// Context around explicit key bytes.
    #[must_use]
    pub fn with_key(key: impl Into<Cow<'static, [u8]>>, client: &str) -> Self {
        Self {
            key: key.into(),
            client: client.to_string(),
            wrapper: OnceCell::new(),
        }
    }

    /// Path of the wrapper script, creating it on first use.
    ///
    /// `None` when no deploy key is available: git then uses its ambient
    /// transport, which suits origins that need no key (e.g. https).
    ///
    /// # Errors
    ///
    /// Returns an error if the wrapper cannot be created.
    pub async fn ensure(&self) -> Result<Option<&Path>> {
        if !self.has_key() {
            debug!("No deploy key, leaving {TRANSPORT_ENV} unset");
            return Ok(None);
        }
        let wrapper = self
            .wrapper
            .get_or_try_init(|| async { TransportWrapper::create(&self.key, &self.client) })
            .await?;
        Ok(Some(wrapper.script_path()))
    }

    /// Whether any key material was supplied.
    #[must_use]
    pub fn has_key(&self) -> bool {
        !self.key.iter().all(u8::is_ascii_whitespace)
    }

    /// The wrapper, if a version-control command has needed it yet.
    #[must_use]
    pub fn wrapper(&self) -> Option<&TransportWrapper> {
        self.wrapper.get()
    }
}

fn write_private(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("create {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("write {}", path.display()))?;
    set_permissions(path, mode)
}

#[cfg(unix)]
fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
