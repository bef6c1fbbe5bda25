//! Remote relay: argument rewriting and the copy/exec command plan.
//!
//! Pure functions only: no I/O, no async, no process spawning.

use std::path::Path;

use crate::domain::config::RemoteConfig;

/// Long flags that take a value in the following argument unless `=`-joined.
const LONG_WITH_VALUE: &[&str] = &["branch", "repo-path", "fqdn", "config"];

/// Short flags that take a value, attached or in the following argument.
const SHORT_WITH_VALUE: &[char] = &['b', 'c'];

const REMOTE_LONG: &str = "remote";
const REMOTE_SHORT: char = 'r';

/// Remove the remote-target flag and its value from `args`, keeping every
/// other argument in its original order.
///
/// Handles `-r V`, `-r=V`, `-rV`, `--remote V`, `--remote=V`, and `r` inside a
/// bundle of boolean short flags (`-qr V`). Values of other value-taking flags
/// are passed through untouched even when they look like `-r`. Nothing after a
/// `--` terminator is rewritten.
#[must_use]
pub fn strip_remote_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            out.push(arg.clone());
            out.extend(iter.cloned());
            break;
        }

        if let Some(long) = arg.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((name, _)) => (name, true),
                None => (long, false),
            };
            if name == REMOTE_LONG {
                if !inline {
                    iter.next();
                }
                continue;
            }
            out.push(arg.clone());
            if !inline && LONG_WITH_VALUE.contains(&name) {
                out.extend(iter.next().cloned());
            }
            continue;
        }

        let Some(shorts) = arg.strip_prefix('-').filter(|s| !s.is_empty()) else {
            out.push(arg.clone());
            continue;
        };

        match rewrite_short_bundle(shorts) {
            ShortBundle::Untouched { value_follows } => {
                out.push(arg.clone());
                if value_follows {
                    out.extend(iter.next().cloned());
                }
            }
            ShortBundle::RemoteRemoved { kept, value_follows } => {
                if value_follows {
                    iter.next();
                }
                if !kept.is_empty() {
                    out.push(format!("-{kept}"));
                }
            }
        }
    }
    out
}

enum ShortBundle {
    Untouched { value_follows: bool },
    RemoteRemoved { kept: String, value_follows: bool },
}

fn rewrite_short_bundle(shorts: &str) -> ShortBundle {
    let mut kept = String::new();
    for (i, c) in shorts.char_indices() {
        let rest = &shorts[i + c.len_utf8()..];
        if c == REMOTE_SHORT {
            return ShortBundle::RemoteRemoved {
                kept,
                value_follows: rest.is_empty(),
            };
        }
        if SHORT_WITH_VALUE.contains(&c) {
            return ShortBundle::Untouched {
                value_follows: rest.is_empty(),
            };
        }
        kept.push(c);
    }
    ShortBundle::Untouched {
        value_follows: false,
    }
}

/// Quote `arg` for a POSIX shell. Plain words pass through unchanged.
#[must_use]
pub fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:@,+%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// The two commands that relay an invocation to `host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayPlan {
    /// Copies the running executable into the remote login directory.
    pub copy: Vec<String>,
    /// Re-invokes the copied executable with elevated privilege.
    pub exec: Vec<String>,
}

/// Build the relay commands for `host`.
///
/// The remote-shell client joins its trailing arguments into a single command
/// line for the remote login shell, so each forwarded argument is quoted.
#[must_use]
pub fn plan_relay(
    remote: &RemoteConfig,
    host: &str,
    executable: &Path,
    forwarded: &[String],
) -> RelayPlan {
    let name = executable
        .file_name()
        .map_or_else(|| "seedling".into(), |n| n.to_string_lossy());

    let copy = vec![
        remote.copy_program.clone(),
        "--".to_string(),
        executable.display().to_string(),
        format!("{host}:{name}"),
    ];

    let mut exec = vec![
        remote.shell_program.clone(),
        "--".to_string(),
        host.to_string(),
        remote.elevate.clone(),
        shell_quote(&format!("./{name}")),
    ];
    exec.extend(forwarded.iter().map(|a| shell_quote(a)));

    RelayPlan { copy, exec }
}
