//! Log subscriber setup.
//!
//! Records go to stderr with timestamp, level and target. `RUST_LOG`
//! overrides the level chosen on the command line.

use anyhow::{Context, Result};
use console::Term;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::{CommandError, Verbosity};

/// Default filter directive for `verbosity`.
#[must_use]
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "warn",
        Verbosity::Normal => "info",
        Verbosity::Debug => "debug",
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(verbosity: Verbosity, no_color: bool) -> Result<()> {
    let ansi = !no_color && Term::stderr().is_term() && std::env::var_os("NO_COLOR").is_none();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(verbosity).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(ansi),
        )
        .try_init()
        .context("installing log subscriber")
}

/// Whether `err` was already logged where it happened.
///
/// A bare `CommandError::Failed` is logged with its output by
/// `CommandRunner::run`; anything wrapped in further context is not.
#[must_use]
pub fn already_logged(err: &anyhow::Error) -> bool {
    err.chain().count() == 1
        && matches!(err.downcast_ref::<CommandError>(), Some(CommandError::Failed { .. }))
}
