//! Application service - relaying an invocation to a remote host.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::application::ports::{CommandRunner, CommandSpec};
use crate::domain::config::RemoteConfig;
use crate::domain::remote::{plan_relay, strip_remote_args};

/// Copy `executable` to `host` and run it there, elevated, with `raw_args`
/// minus the remote flag. Returns the remote exit status.
///
/// Nothing is provisioned locally.
///
/// # Errors
///
/// Returns an error if the copy fails or the remote shell cannot be started.
pub async fn relay(
    runner: &impl CommandRunner,
    remote: &RemoteConfig,
    host: &str,
    executable: &Path,
    raw_args: &[String],
) -> Result<i32> {
    let forwarded = strip_remote_args(raw_args);
    let plan = plan_relay(remote, host, executable, &forwarded);
    let (Some(copy), Some(exec)) = (
        CommandSpec::from_argv(&plan.copy),
        CommandSpec::from_argv(&plan.exec),
    ) else {
        anyhow::bail!("remote relay commands are empty");
    };

    info!("Copying {} to {host}", executable.display());
    runner.run(&copy).await?;

    info!("Running on {host}");
    let status = runner.run_status(&exec).await?;
    Ok(status.unwrap_or_else(|| {
        warn!("Remote shell terminated by a signal");
        1
    }))
}
