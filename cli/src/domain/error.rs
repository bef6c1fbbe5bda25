//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Validation errors ─────────────────────────────────────────────────────────

/// Problems detected before any provisioning side effect happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("This program must be run as root (or use --remote to run it elsewhere).")]
    NotSuperuser,

    #[error("--repo-path {} doesn't seem to point to the source repository", .0.display())]
    InvalidRepoPath(PathBuf),

    #[error("--no-clone enabled, but no source repository encloses {}", .0.display())]
    NoEnclosingRepo(PathBuf),

    #[error("{} exists but is not a checkout; remove it and re-run", .0.display())]
    SourceTreeNotCheckout(PathBuf),
}

// ── Command errors ────────────────────────────────────────────────────────────

/// Failure of an external command.
///
/// A probe treats any of these as "tool absent"; everywhere else they are
/// fatal and unwind the whole run.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command `{command}` failed with status {}", display_status(.status))]
    Failed {
        command: String,
        status: Option<i32>,
        output: String,
    },

    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running `{command}`")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },
}

impl CommandError {
    /// Captured output of the failed command, if any was produced.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Failed { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }
}

#[allow(clippy::ref_option)] // thiserror hands fields over by reference
fn display_status(status: &Option<i32>) -> String {
    status.map_or_else(|| "signal".to_string(), |code| code.to_string())
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors in the settings file or the embedded credential.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tool '{tool}': invalid version requirement '{req}'")]
    InvalidVersionReq { tool: String, req: String },

    #[error("tool '{tool}': probe command is empty")]
    EmptyProbe { tool: String },

    #[error("tool '{tool}': install step {step} is empty")]
    EmptyInstallStep { tool: String, step: usize },

    #[error("cannot read identity file {}", .path.display())]
    UnreadableIdentity {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no deploy key available: build without .build/assets/deploy_key and no transport.identity_file set")]
    MissingDeployKey,
}
