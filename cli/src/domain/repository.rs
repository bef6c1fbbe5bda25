//! Source-tree state resolution.
//!
//! Decides what has to happen to the canonical source tree given what is on
//! disk and what was requested. The filesystem is inspected by the
//! application layer; everything here is a pure function of that observation.

use std::path::{Path, PathBuf};

use crate::domain::invocation::GitRef;

/// What is currently at the canonical source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryState {
    /// Nothing there.
    Absent,
    /// A symlink to an externally supplied tree.
    Symlinked,
    /// A real checkout.
    Present,
}

/// What to do to reach the requested tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceAction {
    /// Symlink the supplied tree into place; no network access.
    Link(PathBuf),
    /// Clone the origin, check out the target, initialise submodules.
    Clone,
    /// Bring the existing tree to the target.
    Sync,
    /// Updates suppressed; leave the existing tree alone.
    Keep,
}

/// One version-control operation against an existing tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStep {
    Fetch,
    Checkout(String),
    Pull,
    SubmoduleSync,
    SubmoduleUpdate,
}

/// Choose the action for `state`.
#[must_use]
pub fn decide(state: RepositoryState, repo_path: Option<&Path>, skip_update: bool) -> SourceAction {
    match (state, repo_path) {
        (RepositoryState::Absent, Some(local)) => SourceAction::Link(local.to_path_buf()),
        (RepositoryState::Absent, None) => SourceAction::Clone,
        (RepositoryState::Symlinked | RepositoryState::Present, _) if skip_update => {
            SourceAction::Keep
        }
        (RepositoryState::Symlinked | RepositoryState::Present, _) => SourceAction::Sync,
    }
}

/// Steps that bring an existing tree to `target`.
///
/// A commit is fetched and checked out detached, never pulled; a branch is
/// checked out and pulled. Submodules are always re-synchronised afterwards.
#[must_use]
pub fn sync_steps(target: GitRef<'_>) -> Vec<SyncStep> {
    let mut steps = match target {
        GitRef::Commit(sha) => vec![SyncStep::Fetch, SyncStep::Checkout(sha.to_string())],
        GitRef::Branch(name) => vec![SyncStep::Checkout(name.to_string()), SyncStep::Pull],
    };
    steps.extend([SyncStep::SubmoduleSync, SyncStep::SubmoduleUpdate]);
    steps
}

/// Steps run inside a fresh clone to reach `target`.
#[must_use]
pub fn clone_steps(target: GitRef<'_>) -> Vec<SyncStep> {
    vec![
        SyncStep::Checkout(target.as_str().to_string()),
        SyncStep::SubmoduleSync,
        SyncStep::SubmoduleUpdate,
    ]
}
