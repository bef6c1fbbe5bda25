//! Seedling - bootstrap a host into a running installation

use std::process::ExitCode;

use clap::Parser;

use seedling_cli::cli::Cli;
use seedling_cli::logging;

/// Conventional status for termination by SIGINT.
const INTERRUPTED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Dropping the run future on interrupt releases every scoped guard
    // (transport key, throwaway clone) and kills the running child.
    tokio::select! {
        result = cli.run() => match result {
            Ok(status) => ExitCode::from(u8::try_from(status).unwrap_or(1)),
            Err(e) => {
                if !logging::already_logged(&e) {
                    tracing::error!("{e:#}");
                }
                if !tracing::dispatcher::has_been_set() {
                    eprintln!("Error: {e:#}");
                }
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted");
            ExitCode::from(INTERRUPTED)
        }
    }
}
