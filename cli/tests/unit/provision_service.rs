//! End-to-end provisioning runs against mocked ports.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use seedling_cli::application::ports::CommandSpec;
use seedling_cli::application::services::provision::{
    ProvisionPorts, create_user_and_home, provision,
};
use seedling_cli::domain::config::SeedlingConfig;
use seedling_cli::domain::{Facts, InvocationConfig};
use seedling_cli::infra::fs::HostFs;
use tempfile::TempDir;

use crate::mocks::{
    MockCommandRunner, MockConfigTool, MockVcs, failed, make_source_tree, ok, settings,
};

/// Probes answer like a host that already has puppet 3 and git.
fn tools_present(cmd: &CommandSpec) -> seedling_cli::application::ports::CommandResult {
    match cmd.program.as_str() {
        "puppet" => ok("3.8.7\n"),
        "git" => ok("git version 2.43.0\n"),
        _ => failed(127, "not found"),
    }
}

fn full_settings(root: &std::path::Path) -> SeedlingConfig {
    let mut settings = settings(root);
    settings.tools = SeedlingConfig::default().tools;
    settings
}

#[tokio::test]
async fn test_fresh_host_bootstraps_clones_and_applies_site() {
    let root = TempDir::new().expect("tempdir");
    let settings = full_settings(root.path());
    let runner = MockCommandRunner::with_handler(tools_present);
    let vcs = MockVcs::default();
    let tool = MockConfigTool::new(&settings.install.home);
    let ports = ProvisionPorts {
        runner: &runner,
        vcs: &vcs,
        tool: &tool,
        fs: &HostFs,
    };

    provision(&ports, &settings, &InvocationConfig::default())
        .await
        .expect("provision");

    assert_eq!(runner.lines(), ["puppet -V", "git --version"]);

    let ops = vcs.ops();
    assert_eq!(ops[0], "shallow_clone git@git.assembla.com:lz5.git master 1");
    assert!(ops[1].starts_with("clone "));
    assert_eq!(&ops[2..], ["checkout master", "submodule_sync", "submodule_update"]);

    let applies = tool.applies();
    assert_eq!(applies.len(), 2);
    let (bootstrap, site) = (&applies[0], &applies[1]);
    assert_eq!(bootstrap.manifest, "vagrant/puppet/manifests/user_home.pp");
    assert!(bootstrap.workdir_existed, "bootstrap manifests were on disk");
    assert!(!bootstrap.workdir.exists(), "throwaway clone removed");
    assert_eq!(site.manifest, "vagrant/puppet/manifests/site.pp");
    assert_eq!(site.workdir, settings.install.source_path());

    let expected = Facts {
        fqdn: "localhost".into(),
        install_application: true,
    };
    assert_eq!(bootstrap.facts, expected);
    assert_eq!(site.facts, expected);
}

#[tokio::test]
async fn test_preset_only_turns_off_application_fact() {
    let root = TempDir::new().expect("tempdir");
    let settings = settings(root.path());
    std::fs::create_dir_all(&settings.install.home).expect("home");
    let runner = MockCommandRunner::new_ok();
    let vcs = MockVcs::default();
    let tool = MockConfigTool::new(&settings.install.home);
    let ports = ProvisionPorts {
        runner: &runner,
        vcs: &vcs,
        tool: &tool,
        fs: &HostFs,
    };
    let invocation = InvocationConfig {
        preset_only: true,
        fqdn: "logs.example.org".into(),
        ..InvocationConfig::default()
    };

    provision(&ports, &settings, &invocation).await.expect("provision");

    let applies = tool.applies();
    assert_eq!(applies.len(), 1, "home existed, so only the site apply runs");
    assert_eq!(
        applies[0].facts,
        Facts {
            fqdn: "logs.example.org".into(),
            install_application: false,
        }
    );
}

#[tokio::test]
async fn test_bootstrap_uses_local_tree_directly() {
    let root = TempDir::new().expect("tempdir");
    let settings = settings(root.path());
    let local = root.path().join("vagrant");
    make_source_tree(&local);
    let runner = MockCommandRunner::new_ok();
    let vcs = MockVcs::default();
    let tool = MockConfigTool::new(&settings.install.home);
    let ports = ProvisionPorts {
        runner: &runner,
        vcs: &vcs,
        tool: &tool,
        fs: &HostFs,
    };
    let invocation = InvocationConfig {
        repo_path: Some(local.clone()),
        ..InvocationConfig::default()
    };

    create_user_and_home(&ports, &settings, &invocation)
        .await
        .expect("bootstrap");

    assert!(vcs.ops().is_empty(), "no clone needed");
    assert_eq!(tool.applies()[0].workdir, local);
    assert!(local.is_dir(), "supplied tree is never removed");
}

#[tokio::test]
async fn test_throwaway_clone_removed_when_bootstrap_apply_fails() {
    let root = TempDir::new().expect("tempdir");
    let settings = settings(root.path());
    let runner = MockCommandRunner::new_ok();
    let vcs = MockVcs::default();
    let tool = MockConfigTool::failing(&settings.install.home);
    let ports = ProvisionPorts {
        runner: &runner,
        vcs: &vcs,
        tool: &tool,
        fs: &HostFs,
    };

    let err = create_user_and_home(&ports, &settings, &InvocationConfig::default())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("puppet apply failed"));
    let scratch = &tool.applies()[0].workdir;
    assert!(!scratch.exists(), "{} must be gone", scratch.display());
}

#[tokio::test]
async fn test_fatal_clone_failure_skips_site_apply() {
    let root = TempDir::new().expect("tempdir");
    let settings = settings(root.path());
    std::fs::create_dir_all(&settings.install.home).expect("home");
    let runner = MockCommandRunner::new_ok();
    let vcs = MockVcs::failing_on("clone");
    let tool = MockConfigTool::new(&settings.install.home);
    let ports = ProvisionPorts {
        runner: &runner,
        vcs: &vcs,
        tool: &tool,
        fs: &HostFs,
    };

    provision(&ports, &settings, &InvocationConfig::default())
        .await
        .unwrap_err();

    assert!(tool.applies().is_empty());
}

#[tokio::test]
async fn test_failed_install_step_stops_run() {
    let root = TempDir::new().expect("tempdir");
    let settings = full_settings(root.path());
    let runner = MockCommandRunner::with_handler(|cmd| match cmd.program.as_str() {
        "puppet" | "wget" => failed(1, "unreachable"),
        _ => ok(""),
    });
    let vcs = MockVcs::default();
    let tool = MockConfigTool::new(&settings.install.home);
    let ports = ProvisionPorts {
        runner: &runner,
        vcs: &vcs,
        tool: &tool,
        fs: &HostFs,
    };

    provision(&ports, &settings, &InvocationConfig::default())
        .await
        .unwrap_err();

    assert_eq!(runner.lines().last().map(String::as_str), Some(
        "wget http://apt.puppetlabs.com/puppetlabs-release-trusty.deb"
    ));
    assert!(vcs.ops().is_empty());
    assert!(tool.applies().is_empty());
}
