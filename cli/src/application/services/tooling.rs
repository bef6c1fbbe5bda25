//! Application service - prerequisite tool installation.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;
use tracing::info;

use crate::application::ports::{CommandRunner, CommandSpec, LocalFs};
use crate::domain::ToolSpec;

/// What `ensure_tool_installed` found or did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// The probe passed; nothing was run.
    Present,
    /// The probe failed or reported an unacceptable version; install steps ran.
    Installed,
}

/// Probe `tool` and run its install steps when the probe fails or the
/// reported version does not satisfy its requirement.
///
/// The probe is tolerant. Install steps are fatal and run in order inside a
/// scratch directory that is removed afterwards. Nothing re-probes after
/// installing.
///
/// # Errors
///
/// Returns an error if an install step fails or the scratch directory
/// cannot be created.
pub async fn ensure_tool_installed(
    runner: &impl CommandRunner,
    fs: &impl LocalFs,
    tool: &ToolSpec,
) -> Result<ToolStatus> {
    let Some(probe) = CommandSpec::from_argv(&tool.probe) else {
        anyhow::bail!("tool '{}': probe command is empty", tool.name);
    };

    match runner.probe(&probe).await {
        Ok(result) if tool.accepts(&result.output)? => {
            info!("{} already installed", tool.name);
            return Ok(ToolStatus::Present);
        }
        Ok(result) => info!(
            "{} version {:?} does not satisfy {}",
            tool.name,
            result.output.trim(),
            tool.version_req.as_deref().unwrap_or("*"),
        ),
        Err(err) => info!("{} not available ({err})", tool.name),
    }

    info!("Installing {}", tool.name);
    let scratch = fs.scratch_dir(&format!("seedling-{}-", tool.name))?;
    for step in &tool.install {
        if let Some(cmd) = CommandSpec::from_argv(step) {
            runner.run(&cmd.cwd(scratch.path())).await?;
        }
    }
    scratch.close()?;
    Ok(ToolStatus::Installed)
}
