//! Domain layer - pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod invocation;
pub mod remote;
pub mod repository;

#[allow(unused_imports)]
pub use config::{SeedlingConfig, ToolSpec, validate_config};
#[allow(unused_imports)]
pub use error::{CommandError, ConfigError, ValidationError};
#[allow(unused_imports)]
pub use invocation::{Facts, GitRef, InvocationConfig, Verbosity};
#[allow(unused_imports)]
pub use repository::{RepositoryState, SourceAction, SyncStep, clone_steps, decide, sync_steps};
