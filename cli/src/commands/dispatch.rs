//! Remote relay command.

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::services::dispatch::relay;

/// Relay this invocation to `host` and return its exit status.
///
/// # Errors
///
/// Returns an error if the executable cannot be located or copied, or the
/// remote shell cannot be started.
pub async fn run(app: &AppContext, host: &str) -> Result<i32> {
    let exe = std::env::current_exe().context("locating the running executable")?;
    let raw_args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    relay(&app.runner, &app.settings.remote, host, &exe, &raw_args).await
}
