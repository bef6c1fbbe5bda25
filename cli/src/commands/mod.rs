//! Command implementations

pub mod dispatch;
pub mod install;
