//! Infrastructure layer - concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, filesystem
//! access, the authenticated transport, and embedded asset access.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::cli` are forbidden.

pub mod assets;
pub mod command_runner;
pub mod config;
pub mod config_tool;
pub mod fs;
pub mod git;
pub mod privilege;
pub mod transport;
