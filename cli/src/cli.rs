//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::app::AppContext;
use crate::commands;
use crate::domain::invocation::{DEFAULT_FQDN, DEFAULT_REF};
use crate::domain::{InvocationConfig, Verbosity};
use crate::infra::config::DEFAULT_CONFIG_PATH;
use crate::logging;

/// Bootstrap this host (or a remote one) into a running installation
#[derive(Parser, Debug)]
#[command(name = "seedling", version)]
#[allow(clippy::struct_excessive_bools)] // independent CLI switches
pub struct Cli {
    /// Branch or 40-character commit id to check out
    #[arg(short, long, value_name = "REF", default_value = DEFAULT_REF)]
    pub branch: String,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "debug")]
    pub quiet: bool,

    /// Log every command's output
    #[arg(short, long)]
    pub debug: bool,

    /// Run the whole installation on this host instead, over ssh
    #[arg(short, long, value_name = "[USER@]HOST")]
    pub remote: Option<String>,

    /// Use this existing source tree instead of cloning
    #[arg(long, value_name = "PATH", conflicts_with = "no_clone")]
    pub repo_path: Option<PathBuf>,

    /// Use the source tree this program lives in
    #[arg(long, alias = "skip-clone")]
    pub no_clone: bool,

    /// Leave an existing source tree untouched
    #[arg(long, alias = "skip-update")]
    pub no_update: bool,

    /// Hostname handed to the configuration tool
    #[arg(long, value_name = "HOST", default_value = DEFAULT_FQDN)]
    pub fqdn: String,

    /// Install packages and base configuration, not the application
    #[arg(short, long)]
    pub preset_only: bool,

    /// Settings file
    #[arg(short, long, value_name = "PATH", env = "SEEDLING_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,
}

impl Cli {
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// The immutable invocation record every component reads.
    #[must_use]
    pub fn invocation(&self) -> InvocationConfig {
        InvocationConfig {
            target: self.branch.clone(),
            verbosity: self.verbosity(),
            remote: self.remote.clone(),
            repo_path: self.repo_path.clone(),
            skip_clone: self.no_clone,
            skip_update: self.no_update,
            preset_only: self.preset_only,
            fqdn: self.fqdn.clone(),
        }
    }

    /// Execute the invocation and return the process exit status.
    ///
    /// # Errors
    ///
    /// Returns the first validation or fatal command error.
    pub async fn run(self) -> Result<i32> {
        logging::init(self.verbosity(), self.no_color)?;
        let app = AppContext::new(&self.config)?;
        let invocation = self.invocation();

        if let Some(host) = invocation.remote.as_deref() {
            return commands::dispatch::run(&app, host).await;
        }
        commands::install::run(&app, invocation).await?;
        Ok(0)
    }
}
