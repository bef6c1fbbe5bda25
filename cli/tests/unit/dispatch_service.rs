//! Remote relay: copy, rewritten arguments, exit status adoption.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;

use seedling_cli::application::services::dispatch::relay;
use seedling_cli::domain::config::RemoteConfig;

use crate::mocks::{MockCommandRunner, failed, ok};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

#[tokio::test]
async fn test_relay_copies_self_and_adopts_remote_status() {
    let runner = MockCommandRunner::new_ok().with_remote_status(Some(7));
    let status = relay(
        &runner,
        &RemoteConfig::default(),
        "host1",
        Path::new("/usr/local/bin/seedling"),
        &args(&["--remote", "host1", "-b", "release", "--fqdn", "logs.example.org"]),
    )
    .await
    .expect("relay");

    assert_eq!(status, 7);
    assert_eq!(
        runner.lines(),
        [
            "scp -- /usr/local/bin/seedling host1:seedling",
            "ssh -- host1 sudo ./seedling -b release --fqdn logs.example.org",
        ]
    );
}

#[tokio::test]
async fn test_relay_strips_short_remote_flag() {
    let runner = MockCommandRunner::new_ok();
    relay(
        &runner,
        &RemoteConfig::default(),
        "admin@host1",
        Path::new("/tmp/seedling"),
        &args(&["-d", "-r", "admin@host1", "--no-update"]),
    )
    .await
    .expect("relay");

    let exec = &runner.recorded_calls()[1];
    assert!(!exec.args.iter().any(|a| a == "-r"));
    assert_eq!(exec.args[exec.args.len() - 2..], ["-d", "--no-update"]);
}

#[tokio::test]
async fn test_failed_copy_never_runs_remote_command() {
    let runner = MockCommandRunner::with_handler(|_| failed(1, "ssh: connect to host host1: No route"));
    let err = relay(
        &runner,
        &RemoteConfig::default(),
        "host1",
        Path::new("/tmp/seedling"),
        &args(&["-r", "host1"]),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("scp"), "got: {err}");
    assert_eq!(runner.recorded_calls().len(), 1);
}

#[tokio::test]
async fn test_remote_killed_by_signal_reports_failure() {
    let runner = MockCommandRunner::with_handler(|_| ok("")).with_remote_status(None);
    let status = relay(
        &runner,
        &RemoteConfig::default(),
        "host1",
        Path::new("/tmp/seedling"),
        &args(&["--remote=host1"]),
    )
    .await
    .expect("relay");
    assert_eq!(status, 1);
}

#[tokio::test]
async fn test_forwarded_arguments_are_quoted_for_remote_shell() {
    let runner = MockCommandRunner::new_ok();
    relay(
        &runner,
        &RemoteConfig::default(),
        "host1",
        Path::new("/tmp/seedling"),
        &args(&["--remote", "host1", "--fqdn", "a b; rm -rf /"]),
    )
    .await
    .expect("relay");

    let exec = &runner.recorded_calls()[1];
    assert_eq!(exec.args.last().map(String::as_str), Some("'a b; rm -rf /'"));
}
